//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file. Editors that save
//! by writing a temporary file and renaming it over the config replace the
//! inode, and a watch on the old inode never fires again.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::AppConfig;
use crate::config::validation::validate_config;

/// Sends a freshly loaded [`AppConfig`] whenever the config file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    bind_override: Option<String>,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                bind_override: None,
                update_tx,
            },
            update_rx,
        )
    }

    /// Re-apply a command-line bind address to every reloaded config, so
    /// reloads compare equal to the running listener.
    pub fn with_bind_override(mut self, bind: Option<String>) -> Self {
        self.bind_override = bind;
        self
    }

    /// Start watching. The returned handle must stay alive for as long as
    /// updates are wanted. Invalid files are logged and skipped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            bind_override,
            update_tx,
        } = self;

        let dir = watch_dir(&path);
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;

        let handler_path = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if !touches_config {
                        return;
                    }

                    tracing::info!(path = ?handler_path, "Config file change detected, reloading");
                    match reload(&handler_path, bind_override.as_deref()) {
                        Ok(config) => {
                            let _ = update_tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Load the file and apply the same overrides used at startup.
pub fn reload(path: &Path, bind_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut config = load_config(path)?;
    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
