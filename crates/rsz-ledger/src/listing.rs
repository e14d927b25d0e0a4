use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Canonical form of a native path: lowercase, forward slashes.
pub fn normalize_native_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// How a bundle touches one native file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceListing {
    /// Normalized native path of the patched file.
    pub target: String,
    /// Replace the whole file instead of patching it.
    #[serde(default)]
    pub replace: bool,
    /// Per-resource diff document; absent means "tracked, unchanged".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_time: Option<DateTime<Utc>>,
}

impl ResourceListing {
    pub fn new(target: &str, replace: bool) -> Self {
        Self {
            target: normalize_native_path(target),
            replace,
            diff: None,
            diff_time: None,
        }
    }

    pub fn has_diff(&self) -> bool {
        self.diff.is_some()
    }
}
