//! Game object diffs.
//!
//! A game object diff is a JSON object with reserved keys for identity
//! ([`GUID_KEY`], [`PREFAB_KEY`]) and own data ([`DATA_KEY`]); every other key
//! is a component class name. Component entries carry either a field diff
//! (the component exists on both sides) or a full component tree (it exists
//! only in the source). Applying is additive: components are patched or
//! appended, never removed.

use std::collections::HashSet;

use rsz_types::{Environment, GameObject, Uuid};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::instance::{apply_instance_diff, get_instance_diff};
use crate::tree::{instance_from_tree, instance_to_tree, TYPE_KEY};

pub const GUID_KEY: &str = "_guid";
pub const PREFAB_KEY: &str = "_prefab";
pub const DATA_KEY: &str = "_data";

/// Diff that turns `target` into `source`, or `None` when identity, own
/// data and components are all unchanged.
///
/// Children are not visited; see [`crate::scene`] for hierarchy diffs.
pub fn get_game_object_diff(
    target: &GameObject,
    source: &GameObject,
    env: &Environment,
) -> DiffResult<Option<Json>> {
    let mut out = Map::new();

    if target.guid != source.guid {
        out.insert(GUID_KEY.into(), Json::String(source.guid.to_string()));
    }
    if target.prefab != source.prefab {
        out.insert(
            PREFAB_KEY.into(),
            source.prefab.clone().map(Json::String).unwrap_or(Json::Null),
        );
    }

    match (&target.data, &source.data) {
        (Some(t), Some(s)) => {
            if let Some(diff) = get_instance_diff(t, s, env)? {
                out.insert(DATA_KEY.into(), diff);
            }
        }
        (None, Some(s)) => {
            out.insert(DATA_KEY.into(), instance_to_tree(s, env)?);
        }
        // Dropping the data instance is not representable.
        (_, None) => {}
    }

    let mut seen = HashSet::new();
    for component in &source.components {
        if !seen.insert(component.class.as_str()) {
            continue;
        }
        match target.component(&component.class) {
            Some(existing) => {
                if let Some(diff) = get_instance_diff(existing, component, env)? {
                    out.insert(component.class.clone(), diff);
                }
            }
            None => {
                out.insert(component.class.clone(), instance_to_tree(component, env)?);
            }
        }
    }

    Ok((!out.is_empty()).then_some(Json::Object(out)))
}

/// Apply a game object diff onto `live`.
pub fn apply_game_object_diff(live: &mut GameObject, diff: &Json, env: &Environment) -> DiffResult<()> {
    let map = diff
        .as_object()
        .ok_or_else(|| DiffError::MalformedDiff(format!("diff for {} is not an object", live.name)))?;

    for (key, value) in map {
        match key.as_str() {
            GUID_KEY => {
                live.guid = value
                    .as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| DiffError::mismatch(GUID_KEY, "a GUID string"))?;
            }
            PREFAB_KEY => {
                live.prefab = match value {
                    Json::Null => None,
                    Json::String(s) => Some(s.clone()),
                    _ => return Err(DiffError::mismatch(PREFAB_KEY, "a string or null")),
                };
            }
            DATA_KEY => {
                if let Some(data) = live.data.as_mut() {
                    apply_instance_diff(data, value, env)?;
                } else if value.get(TYPE_KEY).is_some() {
                    live.data = Some(instance_from_tree(value, None, env)?);
                } else {
                    return Err(DiffError::MissingGameObjectData {
                        name: live.name.clone(),
                    });
                }
            }
            class => match live.component_mut(class) {
                Some(component) => apply_instance_diff(component, value, env)?,
                None => {
                    let component = instance_from_tree(value, Some(class), env)?;
                    debug!(object = %live.name, class, "adding component");
                    live.components.push(component);
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsz_types::{ClassDef, FieldDef, FieldKind, Instance, Value};
    use serde_json::json;

    fn env() -> Environment {
        Environment::new()
            .with_class(
                ClassDef::new("via.Transform")
                    .with_field(FieldDef::scalar("Position", FieldKind::Vec3))
                    .with_field(FieldDef::scalar("Scale", FieldKind::F32)),
            )
            .with_class(ClassDef::new("app.Light").with_field(FieldDef::scalar("Intensity", FieldKind::F32)))
            .with_class(ClassDef::new("app.Sound").with_field(FieldDef::scalar("Cue", FieldKind::String)))
            .with_class(
                ClassDef::new("via.GameObject")
                    .with_field(FieldDef::scalar("Name", FieldKind::String))
                    .with_field(FieldDef::scalar("Draw", FieldKind::Bool)),
            )
    }

    fn transform(x: f32) -> Instance {
        Instance::new("via.Transform", vec![Value::Vec3([x, 0.0, 0.0]), Value::F32(1.0)])
    }

    fn light(i: f32) -> Instance {
        Instance::new("app.Light", vec![Value::F32(i)])
    }

    fn data(draw: bool) -> Instance {
        Instance::new("via.GameObject", vec!["Lamp".into(), Value::Bool(draw)])
    }

    fn lamp() -> GameObject {
        GameObject::new("Lamp")
            .with_guid(Uuid::from_u128(1))
            .with_data(data(true))
            .with_component(transform(0.0))
    }

    #[test]
    fn identical_objects_have_no_diff() {
        assert_eq!(get_game_object_diff(&lamp(), &lamp(), &env()).unwrap(), None);
    }

    #[test]
    fn identity_changes_use_reserved_keys() {
        let mut source = lamp();
        source.guid = Uuid::from_u128(2);
        source.prefab = Some("prefab/lamp.pfb".into());
        let diff = get_game_object_diff(&lamp(), &source, &env()).unwrap().unwrap();
        assert_eq!(
            diff,
            json!({"_guid": "00000000-0000-0000-0000-000000000002", "_prefab": "prefab/lamp.pfb"})
        );

        let mut live = lamp();
        apply_game_object_diff(&mut live, &diff, &env()).unwrap();
        assert_eq!(live, source);
    }

    #[test]
    fn data_diff_is_nested() {
        let mut source = lamp();
        source.data = Some(data(false));
        let diff = get_game_object_diff(&lamp(), &source, &env()).unwrap().unwrap();
        assert_eq!(diff, json!({"_data": {"Draw": false}}));
    }

    #[test]
    fn components_are_added_never_removed() {
        let env = env();
        // source {X, Y}, target {X}
        let target = lamp();
        let mut source = lamp().with_component(light(3.0));
        source.components[0] = transform(5.0);

        let diff = get_game_object_diff(&target, &source, &env).unwrap().unwrap();
        assert!(diff.get("app.Light").unwrap().get(TYPE_KEY).is_some());
        assert!(diff.get("via.Transform").unwrap().get(TYPE_KEY).is_none());

        let mut live = target.clone();
        apply_game_object_diff(&mut live, &diff, &env).unwrap();
        assert_eq!(live, source);
    }

    #[test]
    fn target_only_component_survives_apply() {
        let env = env();
        let sound = Instance::new("app.Sound", vec!["hum".into()]);
        let target = lamp().with_component(sound.clone());
        let source = lamp().with_component(light(1.0));

        let diff = get_game_object_diff(&target, &source, &env).unwrap().unwrap();
        assert!(diff.get("app.Sound").is_none());

        let mut live = target.clone();
        apply_game_object_diff(&mut live, &diff, &env).unwrap();
        let classes: Vec<&str> = live.components.iter().map(|c| c.class.as_str()).collect();
        assert_eq!(classes, vec!["via.Transform", "app.Sound", "app.Light"]);
        assert_eq!(live.component("app.Sound"), Some(&sound));
    }

    #[test]
    fn data_diff_without_live_data_fails() {
        let env = env();
        let mut live = GameObject::new("Bare");
        let err = apply_game_object_diff(&mut live, &json!({"_data": {"Draw": false}}), &env).unwrap_err();
        assert_eq!(err, DiffError::MissingGameObjectData { name: "Bare".into() });
    }

    #[test]
    fn full_data_tree_creates_missing_data() {
        let env = env();
        let target = GameObject::new("Lamp");
        let source = GameObject::new("Lamp").with_data(data(true));
        let diff = get_game_object_diff(&target, &source, &env).unwrap().unwrap();
        let mut live = target.clone();
        apply_game_object_diff(&mut live, &diff, &env).unwrap();
        assert_eq!(live, source);
    }

    #[test]
    fn duplicate_component_classes_match_the_first() {
        let env = env();
        let target = lamp().with_component(light(1.0)).with_component(light(2.0));
        let mut source = target.clone();
        source.components[1] = light(9.0);
        source.components[2] = light(8.0);

        let diff = get_game_object_diff(&target, &source, &env).unwrap().unwrap();
        assert_eq!(diff, json!({"app.Light": {"Intensity": 9.0}}));
    }

    #[test]
    fn unknown_component_class_is_a_schema_error() {
        let env = env();
        let mut live = lamp();
        let err = apply_game_object_diff(&mut live, &json!({"app.Unknown": {"$type": "app.Unknown"}}), &env)
            .unwrap_err();
        assert!(matches!(err, DiffError::Schema(_)));
    }
}
