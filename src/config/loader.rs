//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::classifier::ClassifierPolicy;
use crate::config::schema::{AccessConfig, AppConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("access control is enforced but environment variable {0} is not set")]
    MissingSecret(String),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the classifier policy, reading the secret from the process
/// environment.
pub fn resolve_policy(access: &AccessConfig) -> Result<ClassifierPolicy, ConfigError> {
    resolve_policy_with(access, |name| std::env::var(name).ok())
}

/// Build the classifier policy with a custom variable lookup.
///
/// The secret is required when access control is enforced. There is no
/// fallback value.
pub fn resolve_policy_with<F>(access: &AccessConfig, lookup: F) -> Result<ClassifierPolicy, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup(&access.secret_env).filter(|s| !s.is_empty());

    if access.enforce_access_control && secret.is_none() {
        return Err(ConfigError::MissingSecret(access.secret_env.clone()));
    }

    Ok(ClassifierPolicy {
        enforce_access_control: access.enforce_access_control,
        secret,
        redirect_url: access.redirect_url.clone(),
        min_security_score: access.min_security_score,
    })
}
