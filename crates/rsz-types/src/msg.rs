use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One localized message: a GUID, a lookup name and text per language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEntry {
    pub guid: Uuid,
    pub name: String,
    #[serde(default)]
    pub content: BTreeMap<String, String>,
}

impl MsgEntry {
    pub fn new(guid: Uuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            content: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.content.insert(language.into(), text.into());
        self
    }
}

/// A message table file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgFile {
    #[serde(default)]
    pub entries: Vec<MsgEntry>,
}

impl MsgFile {
    pub fn entry(&self, guid: &Uuid) -> Option<&MsgEntry> {
        self.entries.iter().find(|e| e.guid == *guid)
    }

    pub fn entry_by_name(&self, name: &str) -> Option<&MsgEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
