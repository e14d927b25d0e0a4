//! Foundation types for RSZ content editing.
//!
//! This crate provides the in-memory object model that every other crate in
//! the workspace operates on. Parsing and encoding of the binary RSZ format
//! happen elsewhere; by the time data reaches these types it is a plain,
//! reflectable graph of instances.
//!
//! # Key Types
//!
//! - [`FieldKind`]: Scalar type tag of a schema field
//! - [`Environment`] / [`ClassDef`] / [`FieldDef`]: The format environment (class schemas)
//! - [`Value`]: A typed field value
//! - [`Instance`]: A typed object record with positional field values
//! - [`GameObject`]: A node of a hierarchical scene or prefab
//! - [`MsgFile`] / [`MsgEntry`]: Localized message tables
//! - [`BaseFile`]: An already-parsed native file handed to resource handlers

pub mod error;
pub mod file;
pub mod game_object;
pub mod instance;
pub mod kind;
pub mod msg;
pub mod schema;
pub mod value;

pub use error::{TypeError, TypeResult};
pub use file::{BaseFile, RszFile};
pub use game_object::GameObject;
pub use instance::Instance;
pub use kind::FieldKind;
pub use msg::{MsgEntry, MsgFile};
pub use schema::{ClassDef, Environment, FieldDef};
pub use value::Value;

pub use uuid::Uuid;
