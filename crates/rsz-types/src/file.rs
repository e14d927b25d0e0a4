//! Already-parsed native files.
//!
//! The binary codecs live outside this workspace. A [`BaseFile`] is the
//! in-memory form they produce; resource handlers read from it and write
//! back into it, and it is the only owner of the file's canonical content.

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::game_object::GameObject;
use crate::instance::Instance;
use crate::msg::MsgFile;

/// Contents of an RSZ-backed file (scene, prefab or user data).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RszFile {
    /// Root object instances (user files carry exactly one).
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Root game objects (scenes and prefabs).
    #[serde(default)]
    pub game_objects: Vec<GameObject>,
}

/// A parsed native file handed to resource handlers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum BaseFile {
    Rsz(RszFile),
    Msg(MsgFile),
}

impl BaseFile {
    pub fn as_rsz(&self) -> Option<&RszFile> {
        match self {
            BaseFile::Rsz(file) => Some(file),
            BaseFile::Msg(_) => None,
        }
    }

    pub fn as_rsz_mut(&mut self) -> Option<&mut RszFile> {
        match self {
            BaseFile::Rsz(file) => Some(file),
            BaseFile::Msg(_) => None,
        }
    }

    pub fn as_msg(&self) -> Option<&MsgFile> {
        match self {
            BaseFile::Msg(file) => Some(file),
            BaseFile::Rsz(_) => None,
        }
    }

    pub fn as_msg_mut(&mut self) -> Option<&mut MsgFile> {
        match self {
            BaseFile::Msg(file) => Some(file),
            BaseFile::Rsz(_) => None,
        }
    }

    /// Short format tag for log output.
    pub fn format_name(&self) -> &'static str {
        match self {
            BaseFile::Rsz(_) => "rsz",
            BaseFile::Msg(_) => "msg",
        }
    }

    /// Parse a JSON dump of a base file.
    pub fn from_json(json: &str) -> TypeResult<Self> {
        serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Render a base file as pretty JSON.
    pub fn to_json(&self) -> TypeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}
