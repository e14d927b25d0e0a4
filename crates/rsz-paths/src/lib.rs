//! Path addressing for game object hierarchies.
//!
//! Every node of a tree gets a textual path of the form
//! `root_name[/child_name[#occurrence]]*`. Sibling names are not unique, so
//! the n-th sibling sharing a name (1-based, in child order) carries a
//! `#n` suffix; the suffix is omitted for the first occurrence. A `/`, `#`
//! or `\` inside a name is written with a leading `\`.
//!
//! - [`PathNode`]: the tree shape the functions walk
//! - [`ObjectPath`] / [`PathSegment`]: parsed paths
//! - [`iterate`] / [`iterate_forest`]: every node with its path
//! - [`resolve`] / [`resolve_mut`] / [`resolve_in_forest`]: path back to node

pub mod error;
pub mod node;
pub mod path;
pub mod walk;

pub use error::{PathError, PathResult};
pub use node::PathNode;
pub use path::{ObjectPath, PathSegment};
pub use walk::{
    iterate, iterate_forest, resolve, resolve_in_forest, resolve_in_forest_mut, resolve_mut,
};
