use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar type tag of a schema field.
///
/// Arrays are not a separate kind: a field is an array of its kind when
/// [`FieldDef::array`](crate::FieldDef) is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
    String,
    Guid,
    Vec2,
    Vec3,
    Vec4,
    /// A nested instance (or a null reference).
    Object,
}

impl FieldKind {
    /// Returns `true` for the fixed-width integer kinds.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldKind::S8
                | FieldKind::U8
                | FieldKind::S16
                | FieldKind::U16
                | FieldKind::S32
                | FieldKind::U32
                | FieldKind::S64
                | FieldKind::U64
        )
    }

    /// Returns `true` for the floating point kinds.
    pub fn is_float(self) -> bool {
        matches!(self, FieldKind::F32 | FieldKind::F64)
    }

    /// Number of components for vector kinds.
    pub fn vector_len(self) -> Option<usize> {
        match self {
            FieldKind::Vec2 => Some(2),
            FieldKind::Vec3 => Some(3),
            FieldKind::Vec4 => Some(4),
            _ => None,
        }
    }

    /// The lowercase tag used in schema files.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::S8 => "s8",
            FieldKind::U8 => "u8",
            FieldKind::S16 => "s16",
            FieldKind::U16 => "u16",
            FieldKind::S32 => "s32",
            FieldKind::U32 => "u32",
            FieldKind::S64 => "s64",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::String => "string",
            FieldKind::Guid => "guid",
            FieldKind::Vec2 => "vec2",
            FieldKind::Vec3 => "vec3",
            FieldKind::Vec4 => "vec4",
            FieldKind::Object => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
