//! Startup orchestration.
//!
//! Order: configuration, logging, policy (secret from the environment),
//! metrics, listener, config watcher, signal handling, then serve.
//! Any failure before serving is fatal.

use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, resolve_policy, AppConfig, ConfigError};
use crate::error::AppError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

/// Command-line overrides for startup.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML config file. Defaults are used when absent.
    pub config_path: Option<PathBuf>,
    /// Overrides `listener.bind_address`.
    pub bind_address: Option<String>,
}

/// Load and validate the effective configuration.
pub fn effective_config(options: &StartupOptions) -> Result<AppConfig, ConfigError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    if let Some(bind) = &options.bind_address {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Start the service and block until it shuts down.
pub async fn run(options: StartupOptions) -> Result<(), AppError> {
    let config = effective_config(&options)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-caller-info starting");

    let policy = resolve_policy(&config.access)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        enforce_access_control = policy.enforce_access_control,
        min_security_score = policy.min_security_score,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // already validated
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &options.config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            let watcher = watcher.with_bind_override(options.bind_address.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::forward_signals(shutdown));

    let server = HttpServer::new(config, policy);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
