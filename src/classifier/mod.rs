//! Request classification subsystem.
//!
//! # Data Flow
//! ```text
//! inbound HeaderMap (+ transport peer)
//!     → score.rs (edge provenance signals, weighted score)
//!     → gate (only when access control is enforced)
//!         ├─ Deny(Denial)       secret mismatch / no edge headers / low score
//!         └─ Allow
//!     → normalization
//!         device.rs  (priority-ordered device type)
//!         address.rs (forwarded-for → viewer-address → peer)
//!         headers.rs (lookups with "Unknown" fallback, raw snapshot)
//!     → AccessDecision
//! ```
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared state, never fails
//! - Every field has an explicit default, absence is not an error
//! - The shared secret is never copied into any output

pub mod address;
pub mod device;
pub mod headers;
pub mod score;

use axum::http::HeaderMap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

pub use device::{DeviceFlags, DeviceType};
pub use score::{SecurityScore, SecuritySignals};

/// Shown on every denial. Deliberately contains no request data.
pub const DENY_MESSAGE: &str =
    "This application must be accessed through CloudFront for security reasons.";

/// Default minimum score for an allowed request.
pub const DEFAULT_MIN_SCORE: u8 = 70;

/// Policy the classifier runs under. Built once from configuration and
/// swapped wholesale on reload.
#[derive(Clone)]
pub struct ClassifierPolicy {
    /// When false every request is allowed and only normalized.
    pub enforce_access_control: bool,
    /// Expected value of the edge secret header.
    pub secret: Option<String>,
    /// Where denied viewers are sent.
    pub redirect_url: String,
    pub min_security_score: u8,
}

impl fmt::Debug for ClassifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierPolicy")
            .field("enforce_access_control", &self.enforce_access_control)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_url", &self.redirect_url)
            .field("min_security_score", &self.min_security_score)
            .finish()
    }
}

/// How the request reached the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMethod {
    CloudFront,
    Direct,
}

impl fmt::Display for AccessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMethod::CloudFront => f.write_str("CloudFront"),
            AccessMethod::Direct => f.write_str("Direct"),
        }
    }
}

/// Presence marker that replaces the secret in the raw snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecretPresence {
    #[serde(rename = "[PRESENT]")]
    Present,
    #[serde(rename = "[MISSING]")]
    Missing,
}

/// Whitelisted raw header values, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeaders {
    values: Vec<(&'static str, Option<String>)>,
    secret: SecretPresence,
}

impl RawHeaders {
    fn capture(headers: &HeaderMap) -> Self {
        let values = headers::SNAPSHOT_HEADERS
            .iter()
            .map(|name| (*name, headers::value(headers, name).map(str::to_string)))
            .collect();
        let secret = if headers::is_present(headers, headers::EDGE_SECRET) {
            SecretPresence::Present
        } else {
            SecretPresence::Missing
        };
        Self { values, secret }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn secret(&self) -> SecretPresence {
        self.secret
    }

    /// Number of entries, including the secret marker.
    pub fn len(&self) -> usize {
        self.values.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Serialize for RawHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(headers::EDGE_SECRET, &self.secret)?;
        map.end()
    }
}

/// Display record for an allowed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerInfo {
    pub country: String,
    pub city: String,
    pub region: String,
    pub timezone: String,

    pub device_type: DeviceType,
    #[serde(flatten)]
    pub device_flags: DeviceFlags,

    pub ip_address: String,
    pub user_agent: String,
    pub accept_language: String,
    pub cloudfront_edge: String,

    pub server_time: String,
    pub request_id: String,

    pub access_method: AccessMethod,
    pub has_cloudfront_headers: bool,
    pub waf_protected: bool,
    pub security_score: SecurityScore,

    pub raw_headers: RawHeaders,
}

/// First check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    SecretMismatch,
    MissingEdgeHeaders,
    ScoreBelowThreshold,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::SecretMismatch => "secret_mismatch",
            DenyReason::MissingEdgeHeaders => "missing_edge_headers",
            DenyReason::ScoreBelowThreshold => "score_below_threshold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub reason: DenyReason,
    pub message: String,
    pub redirect_url: String,
    pub security_score: SecurityScore,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum AccessDecision {
    Allow(CallerInfo),
    Deny(Denial),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }

    pub fn security_score(&self) -> SecurityScore {
        match self {
            AccessDecision::Allow(info) => info.security_score,
            AccessDecision::Deny(denial) => denial.security_score,
        }
    }
}

/// Classify a request at the current instant.
pub fn classify(headers: &HeaderMap, peer: Option<IpAddr>, policy: &ClassifierPolicy) -> AccessDecision {
    classify_at(headers, peer, policy, Utc::now())
}

/// Classify a request as if evaluated at `now`.
pub fn classify_at(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    policy: &ClassifierPolicy,
    now: DateTime<Utc>,
) -> AccessDecision {
    let signals = SecuritySignals::evaluate(headers, policy.secret.as_deref());
    let score = signals.score();

    if policy.enforce_access_control {
        if let Some(reason) = deny_reason(&signals, score, policy.min_security_score) {
            tracing::warn!(
                reason = reason.as_str(),
                security_score = score.value(),
                secret_matches = signals.secret_matches,
                secret_present = headers::is_present(headers, headers::EDGE_SECRET),
                has_cloudfront_headers = signals.has_cloudfront_headers,
                has_expected_user_agent = signals.has_expected_user_agent,
                has_forwarded_for = signals.has_forwarded_for,
                "Access denied, edge validation failed"
            );
            return AccessDecision::Deny(Denial {
                reason,
                message: DENY_MESSAGE.to_string(),
                redirect_url: policy.redirect_url.clone(),
                security_score: score,
                timestamp: iso_timestamp(now),
            });
        }
    }

    AccessDecision::Allow(normalize(headers, peer, policy, signals, now))
}

fn deny_reason(signals: &SecuritySignals, score: SecurityScore, min_score: u8) -> Option<DenyReason> {
    if !signals.secret_matches {
        Some(DenyReason::SecretMismatch)
    } else if !signals.has_cloudfront_headers {
        Some(DenyReason::MissingEdgeHeaders)
    } else if score.value() < min_score {
        Some(DenyReason::ScoreBelowThreshold)
    } else {
        None
    }
}

fn normalize(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    policy: &ClassifierPolicy,
    signals: SecuritySignals,
    now: DateTime<Utc>,
) -> CallerInfo {
    let device_flags = DeviceFlags::from_headers(headers);
    let access_method = if policy.enforce_access_control || signals.has_cloudfront_headers {
        AccessMethod::CloudFront
    } else {
        AccessMethod::Direct
    };

    CallerInfo {
        country: headers::value_or_unknown(headers, headers::VIEWER_COUNTRY),
        city: headers::value_or_unknown(headers, headers::VIEWER_CITY),
        region: headers::value_or_unknown(headers, headers::VIEWER_REGION),
        timezone: headers::value_or_unknown(headers, headers::VIEWER_TIME_ZONE),

        device_type: device_flags.device_type(),
        device_flags,

        ip_address: address::resolve_client_ip(headers, peer),
        user_agent: headers::value_or_unknown(headers, headers::USER_AGENT),
        accept_language: headers::value_or_unknown(headers, headers::ACCEPT_LANGUAGE),
        cloudfront_edge: headers::value_or_unknown(headers, headers::EDGE_POP),

        server_time: iso_timestamp(now),
        request_id: headers::value_or_unknown(headers, headers::EDGE_REQUEST_ID),

        access_method,
        has_cloudfront_headers: signals.has_cloudfront_headers,
        waf_protected: policy.enforce_access_control,
        security_score: signals.score(),

        raw_headers: RawHeaders::capture(headers),
    }
}

/// UTC timestamp with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
