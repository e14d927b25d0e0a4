use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// An entity a bundle defines or modifies, addressed by `(type, id)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Entity payload as edited in the UI.
    #[serde(default)]
    pub data: Json,
}

impl EntityRecord {
    pub fn new(entity_type: impl Into<String>, id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            entity_type: entity_type.into(),
            data: Json::Null,
        }
    }

    pub fn with_data(mut self, data: Json) -> Self {
        self.data = data;
        self
    }

    pub fn same_key(&self, other: &EntityRecord) -> bool {
        self.id == other.id && self.entity_type == other.entity_type
    }
}

/// Result of recording an entity into a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// An equal record was already present.
    AlreadyRecorded,
    /// A record with the same `(type, id)` was replaced.
    Updated,
    /// No record had this `(type, id)`.
    Added,
}
