use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::instance::Instance;
use crate::kind::FieldKind;

/// A typed field value.
///
/// Floating point payloads make this `PartialEq` only; two values compare
/// equal when their variants and payloads are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Null object reference.
    Null,
    Bool(bool),
    S8(i8),
    U8(u8),
    S16(i16),
    U16(u16),
    S32(i32),
    U32(u32),
    S64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Guid(Uuid),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Object(Box<Instance>),
    Array(Vec<Value>),
}

impl Value {
    /// The zero value of a scalar kind. Object fields default to null.
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::S8 => Value::S8(0),
            FieldKind::U8 => Value::U8(0),
            FieldKind::S16 => Value::S16(0),
            FieldKind::U16 => Value::U16(0),
            FieldKind::S32 => Value::S32(0),
            FieldKind::U32 => Value::U32(0),
            FieldKind::S64 => Value::S64(0),
            FieldKind::U64 => Value::U64(0),
            FieldKind::F32 => Value::F32(0.0),
            FieldKind::F64 => Value::F64(0.0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Guid => Value::Guid(Uuid::nil()),
            FieldKind::Vec2 => Value::Vec2([0.0; 2]),
            FieldKind::Vec3 => Value::Vec3([0.0; 3]),
            FieldKind::Vec4 => Value::Vec4([0.0; 4]),
            FieldKind::Object => Value::Null,
        }
    }

    /// Returns `true` if this (non-array) value is of `kind`.
    pub fn matches_kind(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Value::Null, FieldKind::Object)
                | (Value::Object(_), FieldKind::Object)
                | (Value::Bool(_), FieldKind::Bool)
                | (Value::S8(_), FieldKind::S8)
                | (Value::U8(_), FieldKind::U8)
                | (Value::S16(_), FieldKind::S16)
                | (Value::U16(_), FieldKind::U16)
                | (Value::S32(_), FieldKind::S32)
                | (Value::U32(_), FieldKind::U32)
                | (Value::S64(_), FieldKind::S64)
                | (Value::U64(_), FieldKind::U64)
                | (Value::F32(_), FieldKind::F32)
                | (Value::F64(_), FieldKind::F64)
                | (Value::String(_), FieldKind::String)
                | (Value::Guid(_), FieldKind::Guid)
                | (Value::Vec2(_), FieldKind::Vec2)
                | (Value::Vec3(_), FieldKind::Vec3)
                | (Value::Vec4(_), FieldKind::Vec4)
        )
    }

    /// Signed integer view of any integer or bool value.
    ///
    /// `U64` values above `i64::MAX` are reinterpreted bit-for-bit.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Bool(b) => Some(b as i64),
            Value::S8(v) => Some(v as i64),
            Value::U8(v) => Some(v as i64),
            Value::S16(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::S32(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            Value::S64(v) => Some(v),
            Value::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_instance_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Value::Object(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Build an integer value of `kind` from an `i64`, failing when the
    /// value does not fit.
    pub fn integer(kind: FieldKind, v: i64) -> Option<Self> {
        Some(match kind {
            FieldKind::S8 => Value::S8(i8::try_from(v).ok()?),
            FieldKind::U8 => Value::U8(u8::try_from(v).ok()?),
            FieldKind::S16 => Value::S16(i16::try_from(v).ok()?),
            FieldKind::U16 => Value::U16(u16::try_from(v).ok()?),
            FieldKind::S32 => Value::S32(i32::try_from(v).ok()?),
            FieldKind::U32 => Value::U32(u32::try_from(v).ok()?),
            FieldKind::S64 => Value::S64(v),
            FieldKind::U64 => Value::U64(u64::try_from(v).ok()?),
            _ => return None,
        })
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Object(Box::new(inst))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
