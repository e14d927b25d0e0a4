//! Path-keyed diffs over whole game object hierarchies.

use rsz_paths::{iterate_forest, resolve_in_forest, resolve_in_forest_mut, ObjectPath};
use rsz_types::{Environment, GameObject};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::game_object::{apply_game_object_diff, get_game_object_diff};
use crate::report::ApplyReport;
use crate::tree::{game_object_from_tree, game_object_to_tree};

/// Wraps the full tree of a game object that exists only in the source.
pub const NEW_KEY: &str = "_new";

/// Diff keyed by object path that turns the `target` hierarchy into `source`.
///
/// Objects present only in `source` are emitted once, whole, under
/// [`NEW_KEY`]; their descendants are not listed separately. Objects
/// present only in `target` produce nothing.
pub fn get_scene_diff(
    target: &[GameObject],
    source: &[GameObject],
    env: &Environment,
) -> DiffResult<Option<Json>> {
    let mut out = Map::new();
    let mut added: Vec<ObjectPath> = Vec::new();

    for (node, path) in iterate_forest(source) {
        if added.iter().any(|a| path.is_descendant_of(a)) {
            continue;
        }
        match resolve_in_forest(target, &path) {
            Some(existing) => {
                if let Some(diff) = get_game_object_diff(existing, node, env)? {
                    out.insert(path.to_string(), diff);
                }
            }
            None => {
                let mut unit = Map::new();
                unit.insert(NEW_KEY.into(), game_object_to_tree(node, env)?);
                out.insert(path.to_string(), Json::Object(unit));
                added.push(path);
            }
        }
    }

    Ok((!out.is_empty()).then_some(Json::Object(out)))
}

/// Apply a scene diff onto `roots`.
///
/// Every path is an independent unit. A unit whose path no longer resolves,
/// or whose diff does not fit the live object, is recorded as a failure and
/// the remaining units still run.
pub fn apply_scene_diff(
    roots: &mut Vec<GameObject>,
    diff: &Json,
    env: &Environment,
) -> DiffResult<ApplyReport> {
    let map = diff
        .as_object()
        .ok_or_else(|| DiffError::MalformedDiff("scene diff is not an object".into()))?;

    let mut report = ApplyReport::new();
    for (key, unit) in map {
        let result = apply_unit(roots, key, unit, env);
        debug!(path = %key, ok = result.is_ok(), "scene diff unit");
        report.record(key.as_str(), result);
    }
    Ok(report)
}

fn apply_unit(roots: &mut Vec<GameObject>, key: &str, unit: &Json, env: &Environment) -> DiffResult<()> {
    let path = ObjectPath::parse(key)?;

    if let Some(tree) = unit.get(NEW_KEY) {
        if resolve_in_forest(roots.as_slice(), &path).is_some() {
            debug!(path = %key, "object already present");
            return Ok(());
        }
        let object = game_object_from_tree(tree, env)?;
        match path.parent() {
            None => roots.push(object),
            Some(parent) => resolve_in_forest_mut(roots.as_mut_slice(), &parent)
                .ok_or_else(|| DiffError::UnresolvedPath(parent.to_string()))?
                .children
                .push(object),
        }
        return Ok(());
    }

    let live = resolve_in_forest_mut(roots.as_mut_slice(), &path)
        .ok_or_else(|| DiffError::UnresolvedPath(key.to_string()))?;
    apply_game_object_diff(live, unit, env)
}
