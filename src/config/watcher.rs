//! Settings file watcher for hot reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::settings::{FileSettingsStore, SettingsHandle, SettingsStore, SETTINGS_KEY};

/// Reloads the settings record into the shared snapshot when its file changes.
pub struct SettingsWatcher {
    store: Arc<FileSettingsStore>,
    handle: SettingsHandle,
}

impl SettingsWatcher {
    pub fn new(store: Arc<FileSettingsStore>, handle: SettingsHandle) -> Self {
        Self { store, handle }
    }

    /// Start watching in a background thread. Dropping the returned watcher
    /// stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let record_name = self.store.path_for(SETTINGS_KEY).file_name().map(|n| n.to_os_string());
        let dir: PathBuf = self.store.dir().to_path_buf();
        let store = self.store;
        let handle = self.handle;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_record = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == record_name.as_deref());
                    if touches_record && (event.kind.is_modify() || event.kind.is_create()) {
                        reload(store.as_ref(), &handle);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Settings watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Saves rename a temp file over the record, so watch the directory.
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?dir, "Settings watcher started");
        Ok(watcher)
    }
}

/// Load the record and publish it; a missing or malformed record keeps the
/// current snapshot.
pub fn reload(store: &dyn SettingsStore, handle: &SettingsHandle) -> bool {
    match store.load(SETTINGS_KEY) {
        Ok(Some(settings)) => {
            tracing::info!(merchants = settings.merchants.len(), "Affiliate settings reloaded");
            handle.replace(settings);
            true
        }
        Ok(None) => {
            tracing::warn!("Settings record disappeared. Keeping current settings.");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload settings. Keeping current settings.");
            false
        }
    }
}
