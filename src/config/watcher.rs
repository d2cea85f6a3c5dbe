//! Hot reload of the configuration file.
//!
//! Editors often emit several events for one save. Each event re-reads the
//! file with the startup overrides applied, and only a valid configuration
//! that differs from the active one is sent to the server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_with, Overrides};
use crate::config::schema::GatewayConfig;

/// Re-reads the config file and tracks what the server is running.
#[derive(Debug)]
pub struct Reloader {
    path: PathBuf,
    overrides: Overrides,
    active: GatewayConfig,
}

impl Reloader {
    pub fn new(path: &Path, overrides: Overrides, active: GatewayConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            overrides,
            active,
        }
    }

    /// Load the file again.
    ///
    /// `None` when the file is invalid (the active config stays) or when
    /// nothing changed.
    pub fn reload(&mut self) -> Option<GatewayConfig> {
        let overrides = &self.overrides;
        match load_with(Some(&self.path), |config| overrides.apply(config)) {
            Ok(config) if config == self.active => {
                tracing::debug!(path = ?self.path, "Config file unchanged");
                None
            }
            Ok(config) => {
                self.active = config.clone();
                Some(config)
            }
            Err(e) => {
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload config, keeping current configuration"
                );
                None
            }
        }
    }
}

/// Watches the config file and feeds changed configurations to the server.
pub struct ConfigWatcher {
    reloader: Reloader,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// `active` is the configuration the server starts with.
    pub fn new(
        path: &Path,
        overrides: Overrides,
        active: GatewayConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let reloader = Reloader::new(path, overrides, active);
        (Self { reloader, update_tx }, update_rx)
    }

    /// Start watching. Reloads stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.reloader.path.clone();
        let mut reloader = self.reloader;
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(config) = reloader.reload() {
                        tracing::info!(path = ?reloader.path, "Config file changed, applying");
                        let _ = tx.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
