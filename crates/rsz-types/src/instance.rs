use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::schema::Environment;
use crate::value::Value;

/// A typed object record.
///
/// Values are stored in the order the class schema declares its fields.
/// Name-based access resolves the position through an [`Environment`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub class: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Instance {
    pub fn new(class: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            class: class.into(),
            values,
        }
    }

    /// Read a field by name.
    pub fn field<'a>(&'a self, env: &Environment, name: &str) -> TypeResult<&'a Value> {
        let class = env.class(&self.class)?;
        let (index, _) = class.require_field(name)?;
        self.values.get(index).ok_or_else(|| self.count_error(class.fields.len()))
    }

    /// Mutable access to a field by name.
    pub fn field_mut<'a>(&'a mut self, env: &Environment, name: &str) -> TypeResult<&'a mut Value> {
        let class = env.class(&self.class)?;
        let (index, _) = class.require_field(name)?;
        if index >= self.values.len() {
            return Err(self.count_error(class.fields.len()));
        }
        Ok(&mut self.values[index])
    }

    /// Overwrite a field, checking the value against the declared kind.
    pub fn set_field(&mut self, env: &Environment, name: &str, value: Value) -> TypeResult<()> {
        let class = env.class(&self.class)?;
        let (_, def) = class.require_field(name)?;
        if !def.accepts(&value) {
            return Err(TypeError::kind_mismatch(&self.class, name, def.kind, def.array));
        }
        *self.field_mut(env, name)? = value;
        Ok(())
    }

    /// Check that the value count and every value's shape match the schema,
    /// recursing into nested instances.
    pub fn validate(&self, env: &Environment) -> TypeResult<()> {
        let class = env.class(&self.class)?;
        if class.fields.len() != self.values.len() {
            return Err(self.count_error(class.fields.len()));
        }
        for (def, value) in class.fields.iter().zip(&self.values) {
            if !def.accepts(value) {
                return Err(TypeError::kind_mismatch(&self.class, &def.name, def.kind, def.array));
            }
            let nested: Box<dyn Iterator<Item = &Value>> = match value {
                Value::Array(items) => Box::new(items.iter()),
                other => Box::new(std::iter::once(other)),
            };
            for item in nested {
                if let Value::Object(inst) = item {
                    inst.validate(env)?;
                }
            }
        }
        Ok(())
    }

    fn count_error(&self, expected: usize) -> TypeError {
        TypeError::FieldCount {
            class: self.class.clone(),
            expected,
            actual: self.values.len(),
        }
    }
}
