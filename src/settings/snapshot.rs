//! Shared, atomically replaceable settings snapshot.
//!
//! Readers take an `Arc<GlobalSettings>` at request start and keep it for the
//! whole request. Writers replace the record as a whole.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::settings::model::{GlobalSettings, MerchantEditError, SETTINGS_KEY};
use crate::settings::store::{SettingsError, SettingsStore};

/// Failure of a read-modify-write edit.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Rejected(#[from] MerchantEditError),

    #[error(transparent)]
    Persist(#[from] SettingsError),
}

/// Cloneable handle over the current settings snapshot.
#[derive(Clone)]
pub struct SettingsHandle {
    current: Arc<ArcSwap<GlobalSettings>>,
    writer: Arc<Mutex<()>>,
}

impl SettingsHandle {
    pub fn new(settings: GlobalSettings) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(settings)),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<GlobalSettings> {
        self.current.load_full()
    }

    /// Swap in a new record without persisting it.
    pub fn replace(&self, settings: GlobalSettings) {
        self.current.store(Arc::new(settings));
    }

    /// Serialized read-modify-write: clone the current record, apply `edit`,
    /// persist it, then publish it. Nothing is published if any step fails.
    pub fn edit<T>(
        &self,
        store: &dyn SettingsStore,
        edit: impl FnOnce(&mut GlobalSettings) -> Result<T, MerchantEditError>,
    ) -> Result<T, EditError> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let mut next = GlobalSettings::clone(&self.current.load());
        let output = edit(&mut next)?;
        store.save(SETTINGS_KEY, &next)?;
        self.current.store(Arc::new(next));
        Ok(output)
    }
}

impl std::fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsHandle")
            .field("merchants", &self.current.load().merchants.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::model::{MerchantDraft, MerchantUpdate};
    use crate::settings::store::MemorySettingsStore;

    #[test]
    fn test_reader_keeps_its_snapshot() {
        let handle = SettingsHandle::new(GlobalSettings::default_record());
        let before = handle.load();

        let mut next = GlobalSettings::default();
        next.affiliate_id = "999".into();
        handle.replace(next);

        assert!(before.affiliate_id.is_empty());
        assert_eq!(handle.load().affiliate_id, "999");
    }

    #[test]
    fn test_edit_persists_and_publishes() {
        let store = MemorySettingsStore::new();
        let handle = SettingsHandle::new(GlobalSettings::default_record());

        let key = handle
            .edit(&store, |settings| {
                let draft = MerchantDraft {
                    name: "Bol".into(),
                    network_merchant_id: "7".into(),
                    domains: vec!["bol.com".into()],
                    ..MerchantDraft::default()
                };
                settings.add_merchant(draft).map(|m| m.key.clone())
            })
            .unwrap();

        assert_eq!(key, "bol");
        assert!(handle.load().merchants.get("bol").is_some());
        assert!(store.load(SETTINGS_KEY).unwrap().unwrap().merchants.get("bol").is_some());
    }

    #[test]
    fn test_rejected_edit_publishes_nothing() {
        let store = MemorySettingsStore::new();
        let handle = SettingsHandle::new(GlobalSettings::default_record());

        let err = handle
            .edit(&store, |settings| {
                settings
                    .update_merchant("missing", MerchantUpdate::default())
                    .map(|_| ())
            })
            .unwrap_err();

        assert!(matches!(err, EditError::Rejected(MerchantEditError::UnknownMerchant(_))));
        assert!(store.load(SETTINGS_KEY).unwrap().is_none());
        assert_eq!(*handle.load(), GlobalSettings::default_record());
    }
}
