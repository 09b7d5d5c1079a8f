//! Affiliate settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings store (JSON record keyed "awin_affiliate_settings")
//!     → store.rs (load, or seed the default record)
//!     → model.rs (typed, normalized GlobalSettings)
//!     → snapshot.rs (Arc snapshot shared with request handlers)
//!
//! On admin edit or file change:
//!     clone snapshot → apply edit → persist → atomic swap
//! ```

pub mod model;
pub mod snapshot;
pub mod store;

pub use model::{
    GlobalSettings, Merchant, MerchantDraft, MerchantEditError, MerchantTable, MerchantUpdate,
    SETTINGS_KEY,
};
pub use snapshot::{EditError, SettingsHandle};
pub use store::{load_or_init, FileSettingsStore, MemorySettingsStore, SettingsError, SettingsStore};
