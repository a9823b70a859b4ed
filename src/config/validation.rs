//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (score threshold, addresses, URLs)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::classifier::score::MAX_SCORE;
use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("access.redirect_url: '{0}' must be an absolute http(s) URL")]
    InvalidRedirectUrl(String),

    #[error("access.min_security_score: {0} exceeds the maximum of 100")]
    ScoreOutOfRange(u8),

    #[error("access.secret_env must not be empty")]
    EmptySecretEnv,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let access = &config.access;
    match Url::parse(&access.redirect_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidRedirectUrl(access.redirect_url.clone())),
    }

    if access.min_security_score > MAX_SCORE {
        errors.push(ValidationError::ScoreOutOfRange(access.min_security_score));
    }

    if access.secret_env.trim().is_empty() {
        errors.push(ValidationError::EmptySecretEnv);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
