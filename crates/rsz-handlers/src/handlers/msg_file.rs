use std::collections::HashSet;

use rsz_diff::apply_tree_diff;
use rsz_ids::guid_to_id;
use rsz_types::{BaseFile, Environment, MsgEntry, MsgFile};
use tracing::debug;
use uuid::Uuid;

use crate::config::HandlerConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{NewEntity, ResourceHandler, ResourceMap};
use crate::resource::{ContentResource, ResourceBody};

/// Message tables: one resource per entry, keyed by the folded entry GUID.
#[derive(Debug, Default)]
pub struct MsgFileHandler;

impl MsgFileHandler {
    pub const DISCRIMINATOR: &'static str = "msg-file";

    pub fn from_config(_config: &HandlerConfig, _env: &Environment) -> HandlerResult<Self> {
        Ok(Self)
    }

    fn table<'a>(&self, base: &'a BaseFile) -> HandlerResult<&'a MsgFile> {
        base.as_msg().ok_or_else(|| wrong_format(base.format_name()))
    }

    fn entry_of(resource: &ContentResource) -> HandlerResult<&MsgEntry> {
        match &resource.body {
            ResourceBody::Message(entry) => Ok(entry),
            other => Err(HandlerError::ResourceShape {
                handler: Self::DISCRIMINATOR.into(),
                id: resource.id,
                expected: "message".into(),
                actual: other.shape().into(),
            }),
        }
    }
}

fn wrong_format(actual: &str) -> HandlerError {
    HandlerError::WrongFormat {
        handler: MsgFileHandler::DISCRIMINATOR.into(),
        expected: "msg".into(),
        actual: actual.into(),
    }
}

impl ResourceHandler for MsgFileHandler {
    fn discriminator(&self) -> &'static str {
        Self::DISCRIMINATOR
    }

    fn read_resources(&self, file: &str, base: &BaseFile, _env: &Environment) -> HandlerResult<ResourceMap> {
        let resources: ResourceMap = self
            .table(base)?
            .entries
            .iter()
            .map(|entry| {
                let id = guid_to_id(&entry.guid);
                (id, ContentResource::new(id, file, ResourceBody::Message(entry.clone())))
            })
            .collect();
        debug!(file, count = resources.len(), "message resources read");
        Ok(resources)
    }

    fn modify_resources(
        &self,
        base: &mut BaseFile,
        resources: &ResourceMap,
        _env: &Environment,
    ) -> HandlerResult<()> {
        let format = base.format_name();
        let table = base.as_msg_mut().ok_or_else(|| wrong_format(format))?;

        let mut written = HashSet::new();
        for entry in &mut table.entries {
            let id = guid_to_id(&entry.guid);
            if let Some(resource) = resources.get(&id) {
                *entry = Self::entry_of(resource)?.clone();
                written.insert(id);
            }
        }
        for (id, resource) in resources {
            if !written.contains(id) {
                table.entries.push(Self::entry_of(resource)?.clone());
            }
        }
        Ok(())
    }

    fn create_resource(
        &self,
        file: &str,
        entity: NewEntity<'_>,
        _env: &Environment,
    ) -> HandlerResult<(i64, ContentResource)> {
        let entry = MsgEntry::new(Uuid::now_v7(), entity.label);
        let entry = match entity.initial_diff {
            Some(diff) => {
                let mut tree = serde_json::to_value(&entry)?;
                apply_tree_diff(&mut tree, diff)?;
                serde_json::from_value(tree)?
            }
            None => entry,
        };
        let id = guid_to_id(&entry.guid);
        Ok((id, ContentResource::new(id, file, ResourceBody::Message(entry))))
    }
}
