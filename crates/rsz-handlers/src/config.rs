use serde::{Deserialize, Serialize};

use crate::error::{HandlerError, HandlerResult};

/// Configuration for one resource handler.
///
/// `handler` selects the implementation from the registry; every other key
/// is handler-specific and read through the typed accessors below.
///
/// ```toml
/// handler = "array-file"
/// class = "app.ItemData"
/// array_field = "Items"
/// id_fields = ["Id"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub handler: String,
    #[serde(flatten)]
    pub settings: toml::Table,
}

impl HandlerConfig {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            settings: toml::Table::new(),
        }
    }

    /// Builder-style setting.
    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    /// Parse a standalone TOML table.
    pub fn from_toml(text: &str) -> HandlerResult<Self> {
        toml::from_str(text).map_err(|e| HandlerError::Serialization(e.to_string()))
    }

    pub fn require_str(&self, key: &str) -> HandlerResult<&str> {
        self.optional_str(key)?
            .ok_or_else(|| HandlerError::missing_field(&self.handler, key))
    }

    pub fn optional_str(&self, key: &str) -> HandlerResult<Option<&str>> {
        match self.settings.get(key) {
            None => Ok(None),
            Some(toml::Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(HandlerError::invalid(&self.handler, format!("'{key}' must be a string"))),
        }
    }

    pub fn require_str_list(&self, key: &str) -> HandlerResult<Vec<String>> {
        self.optional_str_list(key)?
            .ok_or_else(|| HandlerError::missing_field(&self.handler, key))
    }

    pub fn optional_str_list(&self, key: &str) -> HandlerResult<Option<Vec<String>>> {
        let Some(value) = self.settings.get(key) else {
            return Ok(None);
        };
        let invalid = || HandlerError::invalid(&self.handler, format!("'{key}' must be a list of strings"));
        let items = value.as_array().ok_or_else(invalid)?;
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<HandlerResult<Vec<_>>>()
            .map(Some)
    }

    pub fn int_or(&self, key: &str, default: i64) -> HandlerResult<i64> {
        match self.settings.get(key) {
            None => Ok(default),
            Some(toml::Value::Integer(n)) => Ok(*n),
            Some(_) => Err(HandlerError::invalid(&self.handler, format!("'{key}' must be an integer"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flattened_settings() {
        let config = HandlerConfig::from_toml(
            r#"
            handler = "array-file"
            class = "app.ItemData"
            array_field = "Items"
            id_fields = ["Id", "Variant"]
            "#,
        )
        .unwrap();
        assert_eq!(config.handler, "array-file");
        assert_eq!(config.require_str("class").unwrap(), "app.ItemData");
        assert_eq!(config.require_str_list("id_fields").unwrap(), vec!["Id", "Variant"]);
        assert_eq!(config.optional_str_list("sub_id_fields").unwrap(), None);
        assert_eq!(config.int_or("root_index", 0).unwrap(), 0);
    }

    #[test]
    fn missing_and_invalid_keys() {
        let config = HandlerConfig::new("user-singleton").with("class", 5);
        assert_eq!(
            config.require_str("array_field"),
            Err(HandlerError::MissingConfigField {
                handler: "user-singleton".into(),
                field: "array_field".into(),
            })
        );
        assert!(matches!(config.require_str("class"), Err(HandlerError::InvalidConfig { .. })));
    }

    #[test]
    fn discriminator_is_required() {
        assert!(matches!(
            HandlerConfig::from_toml("class = \"x\""),
            Err(HandlerError::Serialization(_))
        ));
    }
}
