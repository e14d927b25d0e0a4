//! Editing session SDK for RSZ content bundles.
//!
//! A [`Session`] opens native files through the handlers named in an
//! [`EditorConfig`], tracks edits against a pristine copy, collects the
//! per-resource diffs into a [`Bundle`](rsz_ledger::Bundle) and applies
//! bundles back onto freshly loaded files.

pub mod config;
pub mod error;
pub mod report;
pub mod session;

pub use config::EditorConfig;
pub use error::{SdkError, SdkResult};
pub use report::{BundleFailure, BundleReport};
pub use session::Session;

// Re-export key types
pub use rsz_handlers::{ContentResource, HandlerConfig, ResourceBody, ResourceMap};
pub use rsz_ledger::{Bundle, EntityRecord, ResourceListing};
pub use rsz_types::{BaseFile, Environment};
