//! Editor configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rsz_handlers::HandlerConfig;
use rsz_ledger::normalize_native_path;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Which handler reads which native file.
///
/// ```toml
/// bundle_name = "my-mod"
///
/// [resource_types.items]
/// handler = "array-file"
/// class = "app.ItemData"
/// array_field = "Items"
/// id_fields = ["Id"]
///
/// [files]
/// "natives/stm/itemdata.user.2" = "items"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub bundle_name: Option<String>,
    /// Resource type name to handler configuration.
    #[serde(default)]
    pub resource_types: BTreeMap<String, HandlerConfig>,
    /// Native path to resource type name.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl EditorConfig {
    pub fn from_toml(text: &str) -> SdkResult<Self> {
        let mut config: EditorConfig =
            toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.files = config
            .files
            .into_iter()
            .map(|(path, ty)| (normalize_native_path(&path), ty))
            .collect();
        Ok(config)
    }

    pub fn load(path: &Path) -> SdkResult<Self> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Builder-style resource type registration.
    pub fn with_resource_type(mut self, name: &str, handler: HandlerConfig) -> Self {
        self.resource_types.insert(name.to_string(), handler);
        self
    }

    /// Builder-style file mapping.
    pub fn with_file(mut self, native_path: &str, resource_type: &str) -> Self {
        self.files
            .insert(normalize_native_path(native_path), resource_type.to_string());
        self
    }

    /// Resource type configured for `native_path`.
    pub fn resource_type_for(&self, native_path: &str) -> Option<&str> {
        self.files
            .get(&normalize_native_path(native_path))
            .map(String::as_str)
    }
}
