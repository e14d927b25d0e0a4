//! Bundle ledger for RSZ content mods.
//!
//! A bundle records which native files a mod touches, whether each is
//! replaced or patched, the per-resource diff documents, and the entities
//! the mod defines. It is persisted as pretty-printed JSON.
//!
//! # Key Types
//!
//! - [`Bundle`]: listing, entities and the native-path lookup
//! - [`ResourceListing`]: one native file's target, mode and diff
//! - [`EntityRecord`]: an entity addressed by `(type, id)`

pub mod bundle;
pub mod entity;
pub mod error;
pub mod listing;

pub use bundle::Bundle;
pub use entity::{EntityRecord, RecordOutcome};
pub use error::{LedgerError, LedgerResult};
pub use listing::{normalize_native_path, ResourceListing};
