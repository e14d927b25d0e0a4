use std::collections::BTreeMap;
use std::fmt;

use rsz_types::{BaseFile, Environment};
use serde_json::Value as Json;

use crate::error::{HandlerError, HandlerResult};
use crate::resource::ContentResource;

/// Resources of one file, keyed by resource ID.
pub type ResourceMap = BTreeMap<i64, ContentResource>;

/// An entity a handler is asked to create a resource for.
#[derive(Clone, Copy, Debug)]
pub struct NewEntity<'a> {
    pub id: i64,
    pub label: &'a str,
    /// Field diff applied on top of the default resource, or the full
    /// tree of the resource as collected from another session.
    pub initial_diff: Option<&'a Json>,
}

/// A per-file-shape strategy for moving resources in and out of a base
/// file.
///
/// Handlers hold no file state of their own: the [`BaseFile`] owns the
/// canonical content, and `modify_resources` expects the map produced by an
/// earlier `read_resources` on the same file.
///
/// The trait is object-safe and `Send + Sync` so handlers can live in a
/// shared lookup table.
pub trait ResourceHandler: Send + Sync + fmt::Debug {
    /// The registry key this handler was built from.
    fn discriminator(&self) -> &'static str;

    /// Read every resource out of `base`. `file` is the native path the
    /// resources are attributed to.
    fn read_resources(&self, file: &str, base: &BaseFile, env: &Environment) -> HandlerResult<ResourceMap>;

    /// Write `resources` back into `base`.
    fn modify_resources(
        &self,
        base: &mut BaseFile,
        resources: &ResourceMap,
        env: &Environment,
    ) -> HandlerResult<()>;

    /// Build the resource for a newly created entity.
    fn create_resource(
        &self,
        _file: &str,
        _entity: NewEntity<'_>,
        _env: &Environment,
    ) -> HandlerResult<(i64, ContentResource)> {
        Err(HandlerError::Unsupported {
            handler: self.discriminator().to_string(),
            operation: "resource creation".into(),
        })
    }
}
