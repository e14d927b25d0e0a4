//! Class schemas: the "format environment" that gives instances their shape.
//!
//! An [`Environment`] maps class names to [`ClassDef`]s. Instances store
//! their values positionally, so every name-based lookup goes through the
//! environment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::instance::Instance;
use crate::kind::FieldKind;
use crate::value::Value;

/// Definition of a single field inside a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    /// The field holds an ordered array of `kind` values.
    #[serde(default)]
    pub array: bool,
    /// Declared class for object fields. Informational; the concrete class
    /// of a nested instance is carried by the instance itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl FieldDef {
    /// A single scalar field.
    pub fn scalar(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            array: false,
            class: None,
        }
    }

    /// An array of `kind`.
    pub fn array(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            array: true,
            class: None,
        }
    }

    /// A nested object field of the given class.
    pub fn object(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object,
            array: false,
            class: Some(class.into()),
        }
    }

    /// An array of nested objects of the given class.
    pub fn object_array(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object,
            array: true,
            class: Some(class.into()),
        }
    }

    /// The value a freshly created instance holds for this field.
    pub fn default_value(&self) -> Value {
        if self.array {
            Value::Array(Vec::new())
        } else {
            Value::default_for(self.kind)
        }
    }

    /// Returns `true` if `value` has the shape this field declares.
    pub fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) if self.array => items.iter().all(|v| v.matches_kind(self.kind)),
            _ if self.array => false,
            other => other.matches_kind(self.kind),
        }
    }
}

/// Schema of a class: its name and ordered fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field append.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Position of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Like [`field_index`](Self::field_index) but reports the miss.
    pub fn require_field(&self, name: &str) -> TypeResult<(usize, &FieldDef)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
            .ok_or_else(|| TypeError::UnknownField {
                class: self.name.clone(),
                field: name.to_string(),
            })
    }
}

/// The format environment: every class the loaded game data knows about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    classes: HashMap<String, ClassDef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style class registration.
    pub fn with_class(mut self, class: ClassDef) -> Self {
        self.register(class);
        self
    }

    /// Register (or replace) a class definition.
    pub fn register(&mut self, class: ClassDef) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Look up a class by name.
    pub fn class(&self, name: &str) -> TypeResult<&ClassDef> {
        self.classes
            .get(name)
            .ok_or_else(|| TypeError::UnknownClass(name.to_string()))
    }

    /// Returns `true` if the class is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Create an instance of `class` with every field at its default value.
    pub fn create_instance(&self, class: &str) -> TypeResult<Instance> {
        let def = self.class(class)?;
        let values = def.fields.iter().map(FieldDef::default_value).collect();
        Ok(Instance::new(class, values))
    }

    /// Parse an environment from its JSON form.
    pub fn from_json(json: &str) -> TypeResult<Self> {
        serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}
