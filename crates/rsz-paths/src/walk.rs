use std::collections::HashMap;

use crate::node::PathNode;
use crate::path::{ObjectPath, PathSegment};

/// Every node under (and including) `root`, in depth-first pre-order,
/// paired with its path.
pub fn iterate<N: PathNode>(root: &N) -> Vec<(&N, ObjectPath)> {
    let mut out = Vec::with_capacity(16);
    let path = ObjectPath::root(root.name());
    walk(root, path, &mut out);
    out
}

/// Like [`iterate`] for a list of roots. Same-named roots are numbered the
/// same way same-named siblings are.
pub fn iterate_forest<N: PathNode>(roots: &[N]) -> Vec<(&N, ObjectPath)> {
    let mut out = Vec::with_capacity(roots.len() * 4);
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for root in roots {
        let occurrence = bump(&mut seen, root.name());
        let path = ObjectPath::from_root(PathSegment::new(root.name(), occurrence));
        walk(root, path, &mut out);
    }
    out
}

fn walk<'a, N: PathNode>(node: &'a N, path: ObjectPath, out: &mut Vec<(&'a N, ObjectPath)>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let children = node.children();
    out.push((node, path.clone()));
    for child in children {
        let occurrence = bump(&mut seen, child.name());
        let child_path = path.join(PathSegment::new(child.name(), occurrence));
        walk(child, child_path, out);
    }
}

fn bump<'a>(seen: &mut HashMap<&'a str, usize>, name: &'a str) -> usize {
    let count = seen.entry(name).or_insert(0);
    *count += 1;
    *count
}

fn nth_named<'a, N: PathNode>(nodes: &'a [N], segment: &PathSegment) -> Option<&'a N> {
    nodes
        .iter()
        .filter(|n| n.name() == segment.name)
        .nth(segment.occurrence - 1)
}

fn nth_named_index<N: PathNode>(nodes: &[N], segment: &PathSegment) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.name() == segment.name)
        .nth(segment.occurrence - 1)
        .map(|(i, _)| i)
}

/// Resolve `path` starting at `root`.
///
/// Returns `None` when the path does not parse, when the root name does not
/// match, or when any hop names a child that does not exist.
pub fn resolve<'a, N: PathNode>(root: &'a N, path: &str) -> Option<&'a N> {
    let path = ObjectPath::parse(path).ok()?;
    let (first, rest) = path.segments().split_first()?;
    if first.name != root.name() || first.occurrence != 1 {
        return None;
    }
    descend(root, rest)
}

/// Mutable variant of [`resolve`].
pub fn resolve_mut<'a, N: PathNode>(root: &'a mut N, path: &str) -> Option<&'a mut N> {
    let path = ObjectPath::parse(path).ok()?;
    let (first, rest) = path.segments().split_first()?;
    if first.name != root.name() || first.occurrence != 1 {
        return None;
    }
    descend_mut(root, rest)
}

/// Resolve `path` against a list of roots.
pub fn resolve_in_forest<'a, N: PathNode>(roots: &'a [N], path: &ObjectPath) -> Option<&'a N> {
    let (first, rest) = path.segments().split_first()?;
    let root = nth_named(roots, first)?;
    descend(root, rest)
}

/// Mutable variant of [`resolve_in_forest`].
pub fn resolve_in_forest_mut<'a, N: PathNode>(
    roots: &'a mut [N],
    path: &ObjectPath,
) -> Option<&'a mut N> {
    let (first, rest) = path.segments().split_first()?;
    let index = nth_named_index(roots, first)?;
    descend_mut(&mut roots[index], rest)
}

fn descend<'a, N: PathNode>(mut node: &'a N, segments: &[PathSegment]) -> Option<&'a N> {
    for segment in segments {
        node = nth_named(node.children(), segment)?;
    }
    Some(node)
}

fn descend_mut<'a, N: PathNode>(mut node: &'a mut N, segments: &[PathSegment]) -> Option<&'a mut N> {
    for segment in segments {
        let index = nth_named_index(node.children(), segment)?;
        node = &mut node.children_mut()[index];
    }
    Some(node)
}
