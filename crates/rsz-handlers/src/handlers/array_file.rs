use std::collections::btree_map::Entry;
use std::collections::HashSet;

use rsz_diff::{apply_instance_diff, instance_from_tree, TYPE_KEY};
use rsz_ids::IdGenerator;
use rsz_types::{BaseFile, Environment, Instance, Value};
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::config::HandlerConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{NewEntity, ResourceHandler, ResourceMap};
use crate::resource::{ContentResource, ResourceBody};

/// Resources stored as entries of an array field on a root instance.
///
/// Without sub-ID fields every entry is its own resource. With sub-ID
/// fields, entries sharing an ID are collected into one list resource; the
/// ID is computed from the ID fields alone.
#[derive(Debug)]
pub struct ArrayFileHandler {
    class: String,
    array_field: String,
    root_index: usize,
    ids: IdGenerator,
    sub_id_fields: Vec<String>,
}

impl ArrayFileHandler {
    pub const DISCRIMINATOR: &'static str = "array-file";

    pub fn from_config(config: &HandlerConfig, env: &Environment) -> HandlerResult<Self> {
        let class = config.require_str("class")?;
        let array_field = config.require_str("array_field")?;
        let id_fields = config.require_str_list("id_fields")?;
        let sub_id_fields = config.optional_str_list("sub_id_fields")?.unwrap_or_default();
        let root_index = usize::try_from(config.int_or("root_index", 0)?)
            .map_err(|_| HandlerError::invalid(Self::DISCRIMINATOR, "'root_index' must not be negative"))?;

        let ids = IdGenerator::new(env, class, &id_fields)?;
        let def = env.class(class)?;
        for field in &sub_id_fields {
            def.require_field(field)?;
        }

        Ok(Self {
            class: class.to_string(),
            array_field: array_field.to_string(),
            root_index,
            ids,
            sub_id_fields,
        })
    }

    /// Returns `true` when entries are grouped by shared ID.
    pub fn is_grouped(&self) -> bool {
        !self.sub_id_fields.is_empty()
    }

    fn root<'a>(&self, base: &'a BaseFile) -> HandlerResult<&'a Instance> {
        let file = base.as_rsz().ok_or_else(|| self.wrong_format(base))?;
        file.instances.get(self.root_index).ok_or_else(|| self.missing_root())
    }

    fn root_mut<'a>(&self, base: &'a mut BaseFile) -> HandlerResult<&'a mut Instance> {
        let format = base.format_name();
        let file = base.as_rsz_mut().ok_or_else(|| HandlerError::WrongFormat {
            handler: Self::DISCRIMINATOR.into(),
            expected: "rsz".into(),
            actual: format.into(),
        })?;
        file.instances.get_mut(self.root_index).ok_or_else(|| self.missing_root())
    }

    fn entries<'a>(&self, root: &'a Instance, env: &Environment) -> HandlerResult<&'a [Value]> {
        root.field(env, &self.array_field)?
            .as_array()
            .ok_or_else(|| HandlerError::invalid(Self::DISCRIMINATOR, format!("'{}' is not an array field", self.array_field)))
    }

    fn wrong_format(&self, base: &BaseFile) -> HandlerError {
        HandlerError::WrongFormat {
            handler: Self::DISCRIMINATOR.into(),
            expected: "rsz".into(),
            actual: base.format_name().into(),
        }
    }

    fn missing_root(&self) -> HandlerError {
        HandlerError::MissingRoot {
            handler: Self::DISCRIMINATOR.into(),
            message: format!("no root instance at index {}", self.root_index),
        }
    }

    /// The entry instance, if `value` is one of ours.
    fn entry<'a>(&self, value: &'a Value) -> Option<&'a Instance> {
        value.as_instance().filter(|inst| inst.class == self.class)
    }

    /// A default entry carrying `id`, with `diff` written over it.
    fn default_entry(&self, id: i64, diff: Option<&Json>, env: &Environment) -> HandlerResult<Instance> {
        let mut inst = env.create_instance(&self.class)?;
        if !self.ids.assign_id(&mut inst, id) {
            return Err(HandlerError::IdNotAssignable {
                class: self.class.clone(),
                id,
            });
        }
        if let Some(diff) = diff {
            apply_instance_diff(&mut inst, diff, env)?;
        }
        Ok(inst)
    }

    /// The ID shared by every entry of a new resource.
    fn group_id(&self, requested: i64, items: &[Instance]) -> HandlerResult<i64> {
        let Some((first, rest)) = items.split_first() else {
            return Err(self.entry_count(requested, 0));
        };
        let id = self.ids.get_id(first)?;
        for inst in rest {
            let other = self.ids.get_id(inst)?;
            if other != id {
                return Err(HandlerError::ResourceShape {
                    handler: Self::DISCRIMINATOR.into(),
                    id,
                    expected: "entries sharing one id".into(),
                    actual: format!("an entry with id {other}"),
                });
            }
        }
        Ok(id)
    }

    fn entry_count(&self, id: i64, count: usize) -> HandlerError {
        HandlerError::ResourceShape {
            handler: Self::DISCRIMINATOR.into(),
            id,
            expected: (if self.is_grouped() { "at least one entry" } else { "exactly one entry" }).into(),
            actual: format!("{count} entries"),
        }
    }

    fn body_instances<'a>(&self, resource: &'a ContentResource) -> HandlerResult<&'a [Instance]> {
        match &resource.body {
            ResourceBody::Object(inst) => Ok(std::slice::from_ref(inst)),
            ResourceBody::ObjectList(items) => Ok(items),
            other => Err(HandlerError::ResourceShape {
                handler: Self::DISCRIMINATOR.into(),
                id: resource.id,
                expected: "object or object-list".into(),
                actual: other.shape().into(),
            }),
        }
    }
}

impl ResourceHandler for ArrayFileHandler {
    fn discriminator(&self) -> &'static str {
        Self::DISCRIMINATOR
    }

    fn read_resources(&self, file: &str, base: &BaseFile, env: &Environment) -> HandlerResult<ResourceMap> {
        let root = self.root(base)?;
        let mut resources = ResourceMap::new();

        for value in self.entries(root, env)? {
            let Some(inst) = self.entry(value) else {
                continue;
            };
            let id = self.ids.get_id(inst)?;
            match resources.entry(id) {
                Entry::Vacant(slot) => {
                    let body = if self.is_grouped() {
                        ResourceBody::ObjectList(vec![inst.clone()])
                    } else {
                        ResourceBody::Object(inst.clone())
                    };
                    slot.insert(ContentResource::new(id, file, body));
                }
                Entry::Occupied(mut slot) => match &mut slot.get_mut().body {
                    ResourceBody::ObjectList(items) => items.push(inst.clone()),
                    _ => warn!(file, id, class = %self.class, "duplicate entry id, keeping the first"),
                },
            }
        }

        debug!(file, count = resources.len(), "array resources read");
        Ok(resources)
    }

    fn modify_resources(
        &self,
        base: &mut BaseFile,
        resources: &ResourceMap,
        env: &Environment,
    ) -> HandlerResult<()> {
        let root = self.root_mut(base)?;
        let current = self.entries(root, env)?;

        let mut written: HashSet<i64> = HashSet::new();
        let mut rebuilt: Vec<Value> = Vec::with_capacity(current.len());
        for value in current {
            let Some(inst) = self.entry(value) else {
                rebuilt.push(value.clone());
                continue;
            };
            let id = self.ids.get_id(inst)?;
            match resources.get(&id) {
                // Emit the whole group where its first entry stood.
                Some(resource) => {
                    if written.insert(id) {
                        rebuilt.extend(self.body_instances(resource)?.iter().cloned().map(Value::from));
                    } else if !self.is_grouped() {
                        // Duplicate ID that was never read as a resource.
                        rebuilt.push(value.clone());
                    }
                }
                None => rebuilt.push(value.clone()),
            }
        }

        for (id, resource) in resources {
            if !written.contains(id) {
                rebuilt.extend(self.body_instances(resource)?.iter().cloned().map(Value::from));
            }
        }

        debug!(entries = rebuilt.len(), "array resources written");
        *root.field_mut(env, &self.array_field)? = Value::Array(rebuilt);
        Ok(())
    }

    fn create_resource(
        &self,
        file: &str,
        entity: NewEntity<'_>,
        env: &Environment,
    ) -> HandlerResult<(i64, ContentResource)> {
        let items = match entity.initial_diff {
            Some(Json::Array(trees)) => trees
                .iter()
                .map(|tree| instance_from_tree(tree, Some(self.class.as_str()), env))
                .collect::<Result<Vec<_>, _>>()?,
            Some(tree) if tree.get(TYPE_KEY).is_some() => {
                vec![instance_from_tree(tree, Some(self.class.as_str()), env)?]
            }
            diff => vec![self.default_entry(entity.id, diff, env)?],
        };

        let id = self.group_id(entity.id, &items)?;
        if id != entity.id {
            warn!(requested = entity.id, actual = id, "initial diff changed the entry id");
        }
        let body = if self.is_grouped() {
            ResourceBody::ObjectList(items)
        } else {
            let count = items.len();
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(inst), None) => ResourceBody::Object(inst),
                _ => return Err(self.entry_count(id, count)),
            }
        };
        Ok((id, ContentResource::new(id, file, body)))
    }
}
