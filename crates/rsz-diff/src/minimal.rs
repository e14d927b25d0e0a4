//! Minimal structural diff between two JSON trees.
//!
//! The diff of `target` against `source` holds only what must change in
//! `target` to make it equal `source`:
//!
//! - objects are compared key by key over the keys of `source`;
//! - an object whose [`TYPE_KEY`] changed is emitted whole;
//! - arrays become a sparse map of changed indices plus a [`LEN_KEY`]
//!   marker carrying the new length;
//! - anything else that differs is emitted as the full `source` value.
//!
//! Keys present only in `target` are never emitted, so a diff cannot
//! express removals.

use serde_json::{Map, Value as Json};

use crate::error::{DiffError, DiffResult};
use crate::tree::TYPE_KEY;

/// Key carrying the new length in a sparse array diff.
pub const LEN_KEY: &str = "$len";

/// Compute the diff that turns `target` into `source`.
///
/// Returns `None` when the trees are structurally equal.
pub fn get_minimal_diff(target: &Json, source: &Json) -> Option<Json> {
    if target == source {
        return None;
    }
    match (target, source) {
        (Json::Object(t), Json::Object(s)) => {
            if t.get(TYPE_KEY) != s.get(TYPE_KEY) {
                return Some(source.clone());
            }
            let mut out = Map::new();
            for (key, sv) in s {
                let diff = match t.get(key) {
                    Some(tv) => get_minimal_diff(tv, sv),
                    None => Some(sv.clone()),
                };
                if let Some(diff) = diff {
                    out.insert(key.clone(), diff);
                }
            }
            (!out.is_empty()).then_some(Json::Object(out))
        }
        (Json::Array(t), Json::Array(s)) => {
            let mut out = Map::new();
            out.insert(LEN_KEY.to_string(), Json::from(s.len()));
            for (index, sv) in s.iter().enumerate() {
                let diff = match t.get(index) {
                    Some(tv) => get_minimal_diff(tv, sv),
                    None => Some(sv.clone()),
                };
                if let Some(diff) = diff {
                    out.insert(index.to_string(), diff);
                }
            }
            // Only the marker and no length change: elements differ in
            // target-only keys, which are not emitted.
            if out.len() == 1 && t.len() == s.len() {
                return None;
            }
            Some(Json::Object(out))
        }
        _ => Some(source.clone()),
    }
}

/// Apply a diff produced by [`get_minimal_diff`] to a plain tree.
pub fn apply_tree_diff(tree: &mut Json, diff: &Json) -> DiffResult<()> {
    let Json::Object(map) = diff else {
        *tree = diff.clone();
        return Ok(());
    };
    if map.contains_key(TYPE_KEY) {
        *tree = diff.clone();
        return Ok(());
    }
    if map.contains_key(LEN_KEY) {
        if !tree.is_array() {
            *tree = Json::Array(Vec::new());
        }
        if let Json::Array(items) = tree {
            return apply_sparse_array(items, map);
        }
    }
    match tree {
        Json::Object(live) => {
            for (key, value) in map {
                match live.get_mut(key) {
                    Some(slot) => apply_tree_diff(slot, value)?,
                    None => {
                        live.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        other => *other = diff.clone(),
    }
    Ok(())
}

fn apply_sparse_array(items: &mut Vec<Json>, map: &Map<String, Json>) -> DiffResult<()> {
    let len = sparse_len(map)?;
    let kept = items.len().min(len);
    items.resize(len, Json::Null);
    for (key, value) in sparse_entries(map) {
        let index = sparse_index(key, len)?;
        if index < kept {
            apply_tree_diff(&mut items[index], value)?;
        } else {
            items[index] = value.clone();
        }
    }
    Ok(())
}

/// The `$len` marker of a sparse array diff.
pub(crate) fn sparse_len(map: &Map<String, Json>) -> DiffResult<usize> {
    map.get(LEN_KEY)
        .and_then(Json::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| DiffError::MalformedDiff(format!("{LEN_KEY} must be a non-negative integer")))
}

/// Index entries of a sparse array diff, marker excluded.
pub(crate) fn sparse_entries<'a>(
    map: &'a Map<String, Json>,
) -> impl Iterator<Item = (&'a String, &'a Json)> + 'a {
    map.iter().filter(|(key, _)| key.as_str() != LEN_KEY)
}

pub(crate) fn sparse_index(key: &str, len: usize) -> DiffResult<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| DiffError::MalformedDiff(format!("array index {key} out of range 0..{len}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn equal_trees_have_no_diff() {
        let t = json!({"$type": "app.A", "X": 1, "Y": [1, 2]});
        assert_eq!(get_minimal_diff(&t, &t.clone()), None);
    }

    #[test]
    fn scalar_change_is_emitted_alone() {
        let t = json!({"$type": "app.A", "X": 1, "Y": "a"});
        let s = json!({"$type": "app.A", "X": 2, "Y": "a"});
        assert_eq!(get_minimal_diff(&t, &s), Some(json!({"X": 2})));
    }

    #[test]
    fn nested_objects_recurse() {
        let t = json!({"$type": "app.A", "In": {"$type": "app.B", "P": 1, "Q": 2}});
        let s = json!({"$type": "app.A", "In": {"$type": "app.B", "P": 1, "Q": 3}});
        assert_eq!(get_minimal_diff(&t, &s), Some(json!({"In": {"Q": 3}})));
    }

    #[test]
    fn changed_type_emits_whole_object() {
        let t = json!({"In": {"$type": "app.B", "P": 1}});
        let s = json!({"In": {"$type": "app.C", "P": 1}});
        assert_eq!(
            get_minimal_diff(&t, &s),
            Some(json!({"In": {"$type": "app.C", "P": 1}}))
        );
    }

    #[test]
    fn arrays_are_sparse() {
        let t = json!([1, 2, 3]);
        let s = json!([1, 5, 3, 4]);
        assert_eq!(
            get_minimal_diff(&t, &s),
            Some(json!({"$len": 4, "1": 5, "3": 4}))
        );
        assert_eq!(get_minimal_diff(&s, &t), Some(json!({"$len": 3, "1": 2})));
    }

    #[test]
    fn kind_mismatch_emits_full_source() {
        assert_eq!(get_minimal_diff(&json!(null), &json!({"a": 1})), Some(json!({"a": 1})));
        assert_eq!(get_minimal_diff(&json!([1]), &json!("x")), Some(json!("x")));
        assert_eq!(get_minimal_diff(&json!({"a": 1}), &json!(null)), Some(json!(null)));
    }

    #[test]
    fn target_only_keys_are_ignored() {
        let t = json!({"a": 1, "b": 2});
        let s = json!({"a": 1});
        assert_eq!(get_minimal_diff(&t, &s), None);
    }

    #[test]
    fn apply_reproduces_source() {
        let mut t = json!({"$type": "app.A", "X": 1, "L": [{"V": 1}, {"V": 2}], "N": null});
        let s = json!({"$type": "app.A", "X": 2, "L": [{"V": 1}, {"V": 9}, {"V": 3}], "N": {"$type": "app.B"}});
        let diff = get_minimal_diff(&t, &s).unwrap();
        apply_tree_diff(&mut t, &diff).unwrap();
        assert_eq!(t, s);
    }

    #[test]
    fn apply_shrinks_arrays() {
        let mut t = json!({"L": [1, 2, 3, 4]});
        apply_tree_diff(&mut t, &json!({"L": {"$len": 2}})).unwrap();
        assert_eq!(t, json!({"L": [1, 2]}));
    }

    #[test]
    fn malformed_sparse_diffs_are_rejected() {
        let mut t = json!([1, 2]);
        assert!(matches!(
            apply_tree_diff(&mut t, &json!({"$len": -1})),
            Err(DiffError::MalformedDiff(_))
        ));
        assert!(matches!(
            apply_tree_diff(&mut t, &json!({"$len": 2, "5": 1})),
            Err(DiffError::MalformedDiff(_))
        ));
    }

    fn arb_tree() -> impl Strategy<Value = Json> {
        let leaf = prop_oneof![
            Just(Json::Null),
            any::<bool>().prop_map(Json::from),
            any::<i32>().prop_map(Json::from),
            "[a-z]{0,6}".prop_map(Json::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Json::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Json::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn diff_against_self_is_empty(tree in arb_tree()) {
            prop_assert_eq!(get_minimal_diff(&tree, &tree), None);
        }

        #[test]
        fn apply_after_diff_matches_source(target in arb_tree(), source in arb_tree()) {
            // Removal of object keys is not representable; compare against
            // source layered over target.
            let mut patched = target.clone();
            if let Some(diff) = get_minimal_diff(&target, &source) {
                apply_tree_diff(&mut patched, &diff).unwrap();
            }
            prop_assert_eq!(get_minimal_diff(&patched, &source), None);
        }
    }
}
