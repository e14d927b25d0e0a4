//! Content resources: the editable units a handler reads out of a file.

use std::fmt;

use rsz_diff::{
    apply_instance_diff, apply_tree_diff, get_minimal_diff, instance_from_tree, instance_to_tree,
};
use rsz_types::{Environment, Instance, MsgEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::{HandlerError, HandlerResult};

/// Key tagging the tree form of an opaque payload.
pub const PAYLOAD_KEY: &str = "$payload";

/// Kind of an opaque binary payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    Motion,
    IconRect,
}

impl PayloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::Motion => "motion",
            PayloadKind::IconRect => "icon-rect",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "motion" => Some(PayloadKind::Motion),
            "icon-rect" => Some(PayloadKind::IconRect),
            _ => None,
        }
    }
}

/// Re-encoded binary data that is replaced whole, never diffed field by field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub bytes: Vec<u8>,
}

/// The shape of a resource.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceBody {
    /// A single object instance.
    Object(Instance),
    /// Several instances sharing one logical ID.
    ObjectList(Vec<Instance>),
    /// A localized message entry.
    Message(MsgEntry),
    /// An opaque binary payload.
    Payload(Payload),
}

impl ResourceBody {
    pub fn shape(&self) -> &'static str {
        match self {
            ResourceBody::Object(_) => "object",
            ResourceBody::ObjectList(_) => "object-list",
            ResourceBody::Message(_) => "message",
            ResourceBody::Payload(_) => "payload",
        }
    }
}

/// One logically addressable editable unit inside a native file.
///
/// `Clone` is a deep copy; a pristine clone is what edits are diffed
/// against.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentResource {
    pub id: i64,
    /// Native path of the file the resource was read from.
    pub file: String,
    pub body: ResourceBody,
}

impl ContentResource {
    pub fn new(id: i64, file: impl Into<String>, body: ResourceBody) -> Self {
        Self {
            id,
            file: file.into(),
            body,
        }
    }

    /// Identity string, unique across files: `<file>#<id>`.
    pub fn identity(&self) -> String {
        format!("{}#{}", self.file, self.id)
    }

    /// Structured tree form of the body.
    pub fn to_tree(&self, env: &Environment) -> HandlerResult<Json> {
        Ok(match &self.body {
            ResourceBody::Object(inst) => instance_to_tree(inst, env)?,
            ResourceBody::ObjectList(items) => list_to_tree(items, env)?,
            ResourceBody::Message(entry) => serde_json::to_value(entry)?,
            ResourceBody::Payload(payload) => payload_to_tree(payload),
        })
    }

    /// Diff that turns `base` into `self`, or `None` when unchanged.
    pub fn diff_from(&self, base: &ContentResource, env: &Environment) -> HandlerResult<Option<Json>> {
        let base = base.to_tree(env)?;
        let live = self.to_tree(env)?;
        Ok(get_minimal_diff(&base, &live))
    }

    /// Apply a diff produced by [`diff_from`](Self::diff_from).
    pub fn apply_diff(&mut self, diff: &Json, env: &Environment) -> HandlerResult<()> {
        let id = self.id;
        match &mut self.body {
            ResourceBody::Object(inst) => apply_instance_diff(inst, diff, env)?,
            ResourceBody::ObjectList(items) => {
                let mut tree = list_to_tree(items, env)?;
                apply_tree_diff(&mut tree, diff)?;
                let nodes = tree.as_array().ok_or_else(|| {
                    HandlerError::Serialization(format!("patched list resource {id} is not an array"))
                })?;
                *items = nodes
                    .iter()
                    .map(|t| instance_from_tree(t, None, env))
                    .collect::<Result<Vec<_>, _>>()?;
            }
            ResourceBody::Message(entry) => {
                let mut tree = serde_json::to_value(&*entry)?;
                apply_tree_diff(&mut tree, diff)?;
                *entry = serde_json::from_value(tree)?;
            }
            ResourceBody::Payload(payload) => {
                let mut tree = payload_to_tree(payload);
                apply_tree_diff(&mut tree, diff)?;
                *payload = payload_from_tree(&tree)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ContentResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identity(), self.body.shape())
    }
}

fn list_to_tree(items: &[Instance], env: &Environment) -> HandlerResult<Json> {
    Ok(Json::Array(
        items
            .iter()
            .map(|i| instance_to_tree(i, env))
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn payload_to_tree(payload: &Payload) -> Json {
    let mut map = Map::new();
    map.insert(PAYLOAD_KEY.into(), Json::String(payload.kind.as_str().into()));
    map.insert("data".into(), Json::String(hex::encode(&payload.bytes)));
    Json::Object(map)
}

fn payload_from_tree(tree: &Json) -> HandlerResult<Payload> {
    let kind = tree
        .get(PAYLOAD_KEY)
        .and_then(Json::as_str)
        .and_then(PayloadKind::parse)
        .ok_or_else(|| HandlerError::Serialization("payload without a known kind".into()))?;
    let data = tree
        .get("data")
        .and_then(Json::as_str)
        .ok_or_else(|| HandlerError::Serialization("payload without data".into()))?;
    let bytes = hex::decode(data).map_err(|e| HandlerError::Serialization(e.to_string()))?;
    Ok(Payload { kind, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsz_types::{ClassDef, FieldDef, FieldKind, Uuid, Value};
    use serde_json::json;

    fn env() -> Environment {
        Environment::new().with_class(
            ClassDef::new("app.Drop")
                .with_field(FieldDef::scalar("Id", FieldKind::S32))
                .with_field(FieldDef::scalar("Rate", FieldKind::F32)),
        )
    }

    fn drop_entry(id: i32, rate: f32) -> Instance {
        Instance::new("app.Drop", vec![Value::S32(id), Value::F32(rate)])
    }

    #[test]
    fn identity_combines_file_and_id() {
        let res = ContentResource::new(7, "natives/drops.user", ResourceBody::Object(drop_entry(7, 1.0)));
        assert_eq!(res.identity(), "natives/drops.user#7");
        assert_eq!(res.to_string(), "natives/drops.user#7 (object)");
    }

    #[test]
    fn clone_is_deep() {
        let base = ContentResource::new(1, "f", ResourceBody::ObjectList(vec![drop_entry(1, 0.5)]));
        let mut live = base.clone();
        if let ResourceBody::ObjectList(items) = &mut live.body {
            items[0].values[1] = Value::F32(0.75);
        }
        assert_ne!(base, live);
    }

    #[test]
    fn object_diff_roundtrip() {
        let env = env();
        let base = ContentResource::new(1, "f", ResourceBody::Object(drop_entry(1, 0.5)));
        let mut live = base.clone();
        live.body = ResourceBody::Object(drop_entry(1, 0.25));

        let diff = live.diff_from(&base, &env).unwrap().unwrap();
        assert_eq!(diff, json!({"Rate": 0.25}));

        let mut patched = base.clone();
        patched.apply_diff(&diff, &env).unwrap();
        assert_eq!(patched, live);
        assert_eq!(base.diff_from(&base, &env).unwrap(), None);
    }

    #[test]
    fn list_diff_roundtrip() {
        let env = env();
        let base = ContentResource::new(
            1,
            "f",
            ResourceBody::ObjectList(vec![drop_entry(1, 0.5), drop_entry(1, 0.1)]),
        );
        let mut live = base.clone();
        live.body = ResourceBody::ObjectList(vec![drop_entry(1, 0.5), drop_entry(1, 0.2), drop_entry(1, 0.3)]);

        let diff = live.diff_from(&base, &env).unwrap().unwrap();
        let mut patched = base.clone();
        patched.apply_diff(&diff, &env).unwrap();
        assert_eq!(patched, live);
    }

    #[test]
    fn message_diff_roundtrip() {
        let env = env();
        let entry = rsz_types::MsgEntry::new(Uuid::from_u128(3), "greeting").with_text("en", "Hello");
        let base = ContentResource::new(3, "f", ResourceBody::Message(entry.clone()));
        let mut live = base.clone();
        live.body = ResourceBody::Message(entry.with_text("en", "Hi").with_text("fr", "Salut"));

        let diff = live.diff_from(&base, &env).unwrap().unwrap();
        assert_eq!(diff, json!({"content": {"en": "Hi", "fr": "Salut"}}));
        let mut patched = base.clone();
        patched.apply_diff(&diff, &env).unwrap();
        assert_eq!(patched, live);
    }

    #[test]
    fn payload_tree_is_hex() {
        let env = env();
        let payload = Payload {
            kind: PayloadKind::IconRect,
            bytes: vec![0xde, 0xad],
        };
        let base = ContentResource::new(9, "f", ResourceBody::Payload(payload));
        assert_eq!(
            base.to_tree(&env).unwrap(),
            json!({"$payload": "icon-rect", "data": "dead"})
        );

        let mut live = base.clone();
        live.body = ResourceBody::Payload(Payload {
            kind: PayloadKind::IconRect,
            bytes: vec![0xbe, 0xef, 0x01],
        });
        let diff = live.diff_from(&base, &env).unwrap().unwrap();
        let mut patched = base.clone();
        patched.apply_diff(&diff, &env).unwrap();
        assert_eq!(patched, live);
    }
}
