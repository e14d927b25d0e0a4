//! Conversion between typed values and the generic JSON tree.
//!
//! An instance becomes an object whose first key is [`TYPE_KEY`] followed by
//! one key per schema field in declaration order. Conversion is
//! deterministic: the same instance always yields an equal tree.

use rsz_types::{Environment, FieldDef, FieldKind, GameObject, Instance, Uuid, Value};
use serde_json::{Map, Number, Value as Json};

use crate::error::{DiffError, DiffResult};

/// Key carrying the class name of an instance tree.
pub const TYPE_KEY: &str = "$type";

/// Convert an instance into its tree form.
pub fn instance_to_tree(instance: &Instance, env: &Environment) -> DiffResult<Json> {
    let class = env.class(&instance.class)?;
    if class.fields.len() != instance.values.len() {
        return Err(rsz_types::TypeError::FieldCount {
            class: instance.class.clone(),
            expected: class.fields.len(),
            actual: instance.values.len(),
        }
        .into());
    }
    let mut map = Map::with_capacity(class.fields.len() + 1);
    map.insert(TYPE_KEY.to_string(), Json::String(instance.class.clone()));
    for (def, value) in class.fields.iter().zip(&instance.values) {
        map.insert(def.name.clone(), value_to_tree(value, env)?);
    }
    Ok(Json::Object(map))
}

/// Convert a single value into its tree form.
pub fn value_to_tree(value: &Value, env: &Environment) -> DiffResult<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::S8(v) => Json::from(*v),
        Value::U8(v) => Json::from(*v),
        Value::S16(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::S32(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::S64(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F32(v) => float(*v as f64),
        Value::F64(v) => float(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::Guid(g) => Json::String(g.to_string()),
        Value::Vec2(v) => floats(v),
        Value::Vec3(v) => floats(v),
        Value::Vec4(v) => floats(v),
        Value::Object(inst) => instance_to_tree(inst, env)?,
        Value::Array(items) => Json::Array(
            items
                .iter()
                .map(|v| value_to_tree(v, env))
                .collect::<DiffResult<Vec<_>>>()?,
        ),
    })
}

// Non-finite floats have no JSON form and come back as null.
fn float(v: f64) -> Json {
    Number::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
}

fn floats(v: &[f32]) -> Json {
    Json::Array(v.iter().map(|c| float(*c as f64)).collect())
}

/// Rebuild an instance from its tree form.
///
/// The class is taken from [`TYPE_KEY`], or from `fallback_class` when the
/// tree has none. Fields absent from the tree keep their default value.
pub fn instance_from_tree(
    tree: &Json,
    fallback_class: Option<&str>,
    env: &Environment,
) -> DiffResult<Instance> {
    let map = tree
        .as_object()
        .ok_or_else(|| DiffError::mismatch(fallback_class.unwrap_or("<instance>"), "an object"))?;
    let class_name = match map.get(TYPE_KEY) {
        Some(Json::String(name)) => name.as_str(),
        Some(_) => return Err(DiffError::mismatch(TYPE_KEY, "a class name")),
        None => fallback_class
            .ok_or_else(|| DiffError::MalformedDiff("instance tree without $type".into()))?,
    };
    let class = env.class(class_name)?;
    let values = class
        .fields
        .iter()
        .map(|def| match map.get(&def.name) {
            Some(node) => value_from_tree(node, def, env),
            None => Ok(def.default_value()),
        })
        .collect::<DiffResult<Vec<_>>>()?;
    Ok(Instance::new(class_name, values))
}

/// Rebuild the value of field `def` from its tree form.
pub fn value_from_tree(tree: &Json, def: &FieldDef, env: &Environment) -> DiffResult<Value> {
    if !def.array {
        return scalar_from_tree(tree, def.kind, &def.name, env);
    }
    let items = tree
        .as_array()
        .ok_or_else(|| DiffError::mismatch(&def.name, format!("an array of {}", def.kind)))?;
    let values = items
        .iter()
        .map(|item| scalar_from_tree(item, def.kind, &def.name, env))
        .collect::<DiffResult<Vec<_>>>()?;
    Ok(Value::Array(values))
}

/// Rebuild one non-array value of `kind`.
pub(crate) fn scalar_from_tree(
    tree: &Json,
    kind: FieldKind,
    field: &str,
    env: &Environment,
) -> DiffResult<Value> {
    let mismatch = || DiffError::mismatch(field, kind.to_string());
    let value = match kind {
        FieldKind::Bool => Value::Bool(tree.as_bool().ok_or_else(mismatch)?),
        FieldKind::U64 => Value::U64(tree.as_u64().ok_or_else(mismatch)?),
        k if k.is_integer() => {
            let v = tree.as_i64().ok_or_else(mismatch)?;
            Value::integer(k, v).ok_or_else(mismatch)?
        }
        FieldKind::F32 => Value::F32(float_from_tree(tree).ok_or_else(mismatch)? as f32),
        FieldKind::F64 => Value::F64(float_from_tree(tree).ok_or_else(mismatch)?),
        FieldKind::String => Value::String(tree.as_str().ok_or_else(mismatch)?.to_string()),
        FieldKind::Guid => {
            let s = tree.as_str().ok_or_else(mismatch)?;
            Value::Guid(Uuid::parse_str(s).map_err(|_| mismatch())?)
        }
        FieldKind::Vec2 => Value::Vec2(vector::<2>(tree).ok_or_else(mismatch)?),
        FieldKind::Vec3 => Value::Vec3(vector::<3>(tree).ok_or_else(mismatch)?),
        FieldKind::Vec4 => Value::Vec4(vector::<4>(tree).ok_or_else(mismatch)?),
        FieldKind::Object => match tree {
            Json::Null => Value::Null,
            Json::Object(_) => Value::Object(Box::new(instance_from_tree(tree, None, env)?)),
            _ => return Err(mismatch()),
        },
        _ => return Err(mismatch()),
    };
    Ok(value)
}

fn float_from_tree(tree: &Json) -> Option<f64> {
    match tree {
        Json::Null => Some(f64::NAN),
        other => other.as_f64(),
    }
}

fn vector<const N: usize>(tree: &Json) -> Option<[f32; N]> {
    let items = tree.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = float_from_tree(item)? as f32;
    }
    Some(out)
}

/// Convert a game object and its subtree into tree form.
pub fn game_object_to_tree(go: &GameObject, env: &Environment) -> DiffResult<Json> {
    let mut map = Map::new();
    map.insert("name".into(), Json::String(go.name.clone()));
    map.insert("guid".into(), Json::String(go.guid.to_string()));
    map.insert(
        "prefab".into(),
        go.prefab.clone().map(Json::String).unwrap_or(Json::Null),
    );
    map.insert(
        "data".into(),
        match &go.data {
            Some(data) => instance_to_tree(data, env)?,
            None => Json::Null,
        },
    );
    map.insert(
        "components".into(),
        Json::Array(
            go.components
                .iter()
                .map(|c| instance_to_tree(c, env))
                .collect::<DiffResult<Vec<_>>>()?,
        ),
    );
    map.insert(
        "children".into(),
        Json::Array(
            go.children
                .iter()
                .map(|c| game_object_to_tree(c, env))
                .collect::<DiffResult<Vec<_>>>()?,
        ),
    );
    Ok(Json::Object(map))
}

/// Rebuild a game object and its subtree from tree form.
pub fn game_object_from_tree(tree: &Json, env: &Environment) -> DiffResult<GameObject> {
    let map = tree
        .as_object()
        .ok_or_else(|| DiffError::mismatch("<game object>", "an object"))?;
    let name = map
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| DiffError::mismatch("name", "a string"))?;
    let guid = match map.get("guid") {
        Some(Json::String(s)) => {
            Uuid::parse_str(s).map_err(|_| DiffError::mismatch("guid", "a GUID string"))?
        }
        _ => Uuid::nil(),
    };
    let prefab = map.get("prefab").and_then(Json::as_str).map(str::to_string);
    let data = match map.get("data") {
        Some(node @ Json::Object(_)) => Some(instance_from_tree(node, None, env)?),
        _ => None,
    };
    let components = list(map.get("components"))
        .iter()
        .map(|c| instance_from_tree(c, None, env))
        .collect::<DiffResult<Vec<_>>>()?;
    let children = list(map.get("children"))
        .iter()
        .map(|c| game_object_from_tree(c, env))
        .collect::<DiffResult<Vec<_>>>()?;

    Ok(GameObject {
        name: name.to_string(),
        guid,
        prefab,
        data,
        components,
        children,
    })
}

fn list(node: Option<&Json>) -> &[Json] {
    node.and_then(Json::as_array).map(Vec::as_slice).unwrap_or(&[])
}
