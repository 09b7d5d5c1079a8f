//! Key-value persistence for the settings record.
//!
//! # Responsibilities
//! - Load and save a `GlobalSettings` record under a fixed key
//! - Seed the default record on first start
//!
//! # Design Decisions
//! - Records are JSON documents, one file per key
//! - Saves go through a temp file and rename so readers never see a partial record

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::settings::model::{GlobalSettings, SETTINGS_KEY};

/// Errors raised by a settings store.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode settings record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence seam for the settings record.
pub trait SettingsStore: Send + Sync {
    /// Load the record stored under `key`, or `None` when absent.
    fn load(&self, key: &str) -> Result<Option<GlobalSettings>, SettingsError>;

    /// Replace the record stored under `key`.
    fn save(&self, key: &str, settings: &GlobalSettings) -> Result<(), SettingsError>;
}

/// Return the stored record, persisting and returning the default record when
/// none exists yet.
pub fn load_or_init(store: &dyn SettingsStore) -> Result<GlobalSettings, SettingsError> {
    if let Some(settings) = store.load(SETTINGS_KEY)? {
        return Ok(settings);
    }

    let settings = GlobalSettings::default_record();
    store.save(SETTINGS_KEY, &settings)?;
    tracing::info!(key = SETTINGS_KEY, "Seeded default affiliate settings");
    Ok(settings)
}

/// Stores each record as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the record for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, key: &str) -> Result<Option<GlobalSettings>, SettingsError> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SettingsError::Parse { path, source })
    }

    fn save(&self, key: &str, settings: &GlobalSettings) -> Result<(), SettingsError> {
        let path = self.path_for(key);
        let encoded = serde_json::to_vec_pretty(settings)?;

        fs::create_dir_all(&self.dir).map_err(|source| SettingsError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, encoded).map_err(|source| SettingsError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| SettingsError::Io { path, source })
    }
}

/// Process-local store, used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: Mutex<HashMap<String, GlobalSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, key: &str) -> Result<Option<GlobalSettings>, SettingsError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, settings: &GlobalSettings) -> Result<(), SettingsError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(key.to_string(), settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::model::Merchant;

    #[test]
    fn test_load_or_init_seeds_default() {
        let store = MemorySettingsStore::new();
        assert!(store.load(SETTINGS_KEY).unwrap().is_none());

        let settings = load_or_init(&store).unwrap();
        assert_eq!(settings, GlobalSettings::default_record());
        assert_eq!(store.load(SETTINGS_KEY).unwrap(), Some(settings));
    }

    #[test]
    fn test_load_or_init_keeps_existing() {
        let store = MemorySettingsStore::new();
        let mut existing = GlobalSettings::default();
        existing.affiliate_id = "999".into();
        store.save(SETTINGS_KEY, &existing).unwrap();

        assert_eq!(load_or_init(&store).unwrap(), existing);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested"));
        assert!(store.load(SETTINGS_KEY).unwrap().is_none());

        let mut settings = GlobalSettings::default_record();
        settings.affiliate_id = "999".into();
        settings
            .merchants
            .insert(Merchant::new("bol", "Bol", "7").with_domains(["bol.com"]));
        store.save(SETTINGS_KEY, &settings).unwrap();

        assert!(store.path_for(SETTINGS_KEY).exists());
        assert_eq!(store.load(SETTINGS_KEY).unwrap(), Some(settings));
    }

    #[test]
    fn test_file_store_reports_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path());
        fs::write(store.path_for(SETTINGS_KEY), "{ not json").unwrap();

        let err = store.load(SETTINGS_KEY).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
