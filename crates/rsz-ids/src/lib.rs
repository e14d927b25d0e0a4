//! Resource identity derivation.
//!
//! Resources inside a native file are looked up by a 64-bit ID computed from
//! one or more designated fields of their instance. The conversion applied
//! to each field is picked from a table keyed by the field's scalar type tag
//! when the generator is built, so a bad schema fails at setup instead of
//! producing a wrong ID later.
//!
//! - [`IdGenerator`]: resolves ID fields against a class and computes IDs
//! - [`IdConversion`]: per-type conversion table
//! - [`guid_to_id`] / [`string_to_id`]: hash folding helpers

pub mod error;
pub mod fold;
pub mod generator;

pub use error::{IdError, IdResult};
pub use fold::{guid_to_id, string_to_id};
pub use generator::{IdConversion, IdField, IdGenerator};
