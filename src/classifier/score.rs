//! Edge provenance signals and the weighted security score.

use axum::http::HeaderMap;
use serde::{Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

use super::headers;

const SECRET_WEIGHT: u8 = 40;
const EDGE_HEADERS_WEIGHT: u8 = 30;
const EDGE_USER_AGENT_WEIGHT: u8 = 20;
const FORWARDED_FOR_WEIGHT: u8 = 10;

/// Sum of all weights.
pub const MAX_SCORE: u8 = 100;

/// Weighted score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SecurityScore(u8);

impl SecurityScore {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SecurityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

impl Serialize for SecurityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// Booleans that indicate a request really came through the distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SecuritySignals {
    pub secret_matches: bool,
    pub has_cloudfront_headers: bool,
    pub has_expected_user_agent: bool,
    pub has_forwarded_for: bool,
}

impl SecuritySignals {
    /// Read the signals from `headers`. With no configured secret the
    /// secret signal is always false.
    pub fn evaluate(headers: &HeaderMap, expected_secret: Option<&str>) -> Self {
        let secret_matches = match (headers::value(headers, headers::EDGE_SECRET), expected_secret) {
            (Some(presented), Some(expected)) => secret_eq(presented, expected),
            _ => false,
        };

        let via_from_edge = headers::value(headers, headers::VIA)
            .map(|via| via.contains(headers::VIA_EDGE_MARKER))
            .unwrap_or(false);

        Self {
            secret_matches,
            has_cloudfront_headers: headers::is_present(headers, headers::VIEWER_COUNTRY)
                || headers::is_present(headers, headers::EDGE_REQUEST_ID)
                || via_from_edge,
            has_expected_user_agent: headers::value(headers, headers::USER_AGENT)
                == Some(headers::EDGE_USER_AGENT),
            has_forwarded_for: headers::is_present(headers, headers::FORWARDED_FOR),
        }
    }

    pub fn score(&self) -> SecurityScore {
        let mut score = 0;
        if self.secret_matches {
            score += SECRET_WEIGHT;
        }
        if self.has_cloudfront_headers {
            score += EDGE_HEADERS_WEIGHT;
        }
        if self.has_expected_user_agent {
            score += EDGE_USER_AGENT_WEIGHT;
        }
        if self.has_forwarded_for {
            score += FORWARDED_FOR_WEIGHT;
        }
        SecurityScore(score)
    }
}

/// Constant-time comparison. Length still leaks, content does not.
fn secret_eq(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
