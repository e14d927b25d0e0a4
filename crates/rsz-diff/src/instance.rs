//! Flat instance diffs and their typed application.

use rsz_types::{Environment, FieldDef, FieldKind, Instance, TypeError, Value};
use serde_json::Value as Json;

use crate::error::{DiffError, DiffResult};
use crate::minimal::{apply_tree_diff, get_minimal_diff, sparse_entries, sparse_index, sparse_len, LEN_KEY};
use crate::tree::{instance_from_tree, instance_to_tree, scalar_from_tree, value_from_tree, value_to_tree, TYPE_KEY};

/// Diff that turns `target` into `source`, or `None` when they are equal.
pub fn get_instance_diff(
    target: &Instance,
    source: &Instance,
    env: &Environment,
) -> DiffResult<Option<Json>> {
    let target = instance_to_tree(target, env)?;
    let source = instance_to_tree(source, env)?;
    Ok(get_minimal_diff(&target, &source))
}

/// Write every field present in `diff` into `live`.
///
/// A diff carrying a different [`TYPE_KEY`] replaces the instance outright.
/// Fields the diff names but the class lacks abort with
/// [`DiffError::MissingField`]; fields written before the failure stay
/// written.
pub fn apply_instance_diff(live: &mut Instance, diff: &Json, env: &Environment) -> DiffResult<()> {
    let map = diff
        .as_object()
        .ok_or_else(|| DiffError::MalformedDiff(format!("diff for {} is not an object", live.class)))?;

    if let Some(class) = map.get(TYPE_KEY) {
        if class.as_str() != Some(live.class.as_str()) {
            *live = instance_from_tree(diff, None, env)?;
            return Ok(());
        }
    }

    let class = env.class(&live.class)?;
    if class.fields.len() != live.values.len() {
        return Err(TypeError::FieldCount {
            class: live.class.clone(),
            expected: class.fields.len(),
            actual: live.values.len(),
        }
        .into());
    }

    for (key, field_diff) in map {
        if key == TYPE_KEY {
            continue;
        }
        let (index, def) = class.require_field(key).map_err(|_| DiffError::MissingField {
            class: live.class.clone(),
            field: key.clone(),
        })?;
        apply_value_diff(&mut live.values[index], field_diff, def, env)?;
    }
    Ok(())
}

fn apply_value_diff(slot: &mut Value, diff: &Json, def: &FieldDef, env: &Environment) -> DiffResult<()> {
    if !def.array {
        return apply_element_diff(slot, diff, def.kind, &def.name, env);
    }
    let Json::Object(map) = diff else {
        *slot = value_from_tree(diff, def, env)?;
        return Ok(());
    };
    if !map.contains_key(LEN_KEY) {
        return Err(DiffError::mismatch(&def.name, format!("an array of {}", def.kind)));
    }

    let len = sparse_len(map)?;
    if !matches!(slot, Value::Array(_)) {
        *slot = Value::Array(Vec::new());
    }
    let Value::Array(items) = slot else {
        return Err(DiffError::mismatch(&def.name, "an array"));
    };

    let kept = items.len().min(len);
    items.truncate(kept);
    items.resize(len, Value::default_for(def.kind));
    for (key, element) in sparse_entries(map) {
        let index = sparse_index(key, len)?;
        if index < kept {
            apply_element_diff(&mut items[index], element, def.kind, &def.name, env)?;
        } else {
            items[index] = scalar_from_tree(element, def.kind, &def.name, env)?;
        }
    }
    Ok(())
}

fn apply_element_diff(
    slot: &mut Value,
    diff: &Json,
    kind: FieldKind,
    field: &str,
    env: &Environment,
) -> DiffResult<()> {
    if kind == FieldKind::Object {
        if let (Json::Object(_), Value::Object(inst)) = (diff, &mut *slot) {
            return apply_instance_diff(inst, diff, env);
        }
        *slot = scalar_from_tree(diff, kind, field, env)?;
        return Ok(());
    }
    if diff.is_object() {
        // Vectors travel as arrays, so their diffs are sparse maps.
        let mut tree = value_to_tree(slot, env)?;
        apply_tree_diff(&mut tree, diff)?;
        *slot = scalar_from_tree(&tree, kind, field, env)?;
        return Ok(());
    }
    *slot = scalar_from_tree(diff, kind, field, env)?;
    Ok(())
}
