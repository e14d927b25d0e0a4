//! Diff engine for RSZ content.
//!
//! Edits are stored as minimal structural diffs against an unmodified base
//! file and applied back onto live object graphs.
//!
//! # Layers
//!
//! - [`tree`]: typed instances to and from a generic JSON tree
//! - [`minimal`]: minimal diff between two trees, and its plain-tree apply
//! - [`instance`]: flat instance diff and typed apply
//! - [`game_object`]: game object diff (`_guid`, `_prefab`, `_data`, components)
//! - [`scene`]: path-keyed diffs over whole game object hierarchies
//!
//! An empty diff is always `None`, never an empty object.

pub mod error;
pub mod game_object;
pub mod instance;
pub mod minimal;
pub mod report;
pub mod scene;
pub mod tree;

pub use error::{DiffError, DiffResult};
pub use game_object::{apply_game_object_diff, get_game_object_diff, DATA_KEY, GUID_KEY, PREFAB_KEY};
pub use instance::{apply_instance_diff, get_instance_diff};
pub use minimal::{apply_tree_diff, get_minimal_diff, LEN_KEY};
pub use report::{ApplyReport, UnitFailure};
pub use scene::{apply_scene_diff, get_scene_diff, NEW_KEY};
pub use tree::{
    game_object_from_tree, game_object_to_tree, instance_from_tree, instance_to_tree,
    value_from_tree, value_to_tree, TYPE_KEY,
};

/// The JSON tree type diffs are expressed in.
pub use serde_json::Value as Tree;
