use rsz_types::{Environment, FieldKind, Instance, Value};

use crate::error::{IdError, IdResult};
use crate::fold::{domain_hasher, finish, guid_to_id, string_to_id, COMPOSITE_DOMAIN};

/// How a field value is turned into ID material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdConversion {
    /// Integer or bool, widened to `i64`.
    Widen,
    /// GUID, folded through BLAKE3.
    Guid,
    /// String, folded through BLAKE3.
    String,
}

impl IdConversion {
    /// The conversion table. `None` means the kind cannot carry an ID.
    pub fn for_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Bool
            | FieldKind::S8
            | FieldKind::U8
            | FieldKind::S16
            | FieldKind::U16
            | FieldKind::S32
            | FieldKind::U32
            | FieldKind::S64
            | FieldKind::U64 => Some(IdConversion::Widen),
            FieldKind::Guid => Some(IdConversion::Guid),
            FieldKind::String => Some(IdConversion::String),
            FieldKind::F32
            | FieldKind::F64
            | FieldKind::Vec2
            | FieldKind::Vec3
            | FieldKind::Vec4
            | FieldKind::Object => None,
        }
    }
}

/// An ID field resolved against its class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdField {
    pub name: String,
    pub index: usize,
    pub kind: FieldKind,
    pub conversion: IdConversion,
}

/// Computes resource IDs for instances of one class.
///
/// With a single ID field the value is widened (integers) or folded
/// (GUIDs, strings). With several fields every value is fed, in declaration
/// order, into one domain-separated hash; swapping the field order yields a
/// different ID.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    class: String,
    fields: Vec<IdField>,
}

impl IdGenerator {
    /// Resolve `id_fields` on `class`.
    pub fn new<S: AsRef<str>>(env: &Environment, class: &str, id_fields: &[S]) -> IdResult<Self> {
        if id_fields.is_empty() {
            return Err(IdError::NoIdFields {
                class: class.to_string(),
            });
        }
        let def = env.class(class)?;
        let fields = id_fields
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let (index, field) = def.require_field(name)?;
                let conversion = IdConversion::for_kind(field.kind)
                    .filter(|_| !field.array)
                    .ok_or_else(|| IdError::UnsupportedFieldKind {
                        class: class.to_string(),
                        field: name.to_string(),
                        kind: field.kind,
                    })?;
                Ok(IdField {
                    name: name.to_string(),
                    index,
                    kind: field.kind,
                    conversion,
                })
            })
            .collect::<IdResult<Vec<_>>>()?;

        Ok(Self {
            class: class.to_string(),
            fields,
        })
    }

    /// The class this generator reads.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The resolved ID fields, in declaration order.
    pub fn fields(&self) -> &[IdField] {
        &self.fields
    }

    /// Returns `true` when more than one field makes up the ID.
    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    /// Compute the ID of `instance`.
    pub fn get_id(&self, instance: &Instance) -> IdResult<i64> {
        if instance.class != self.class {
            return Err(IdError::ClassMismatch {
                expected: self.class.clone(),
                actual: instance.class.clone(),
            });
        }

        if let [field] = self.fields.as_slice() {
            let value = self.value_of(instance, field)?;
            return match field.conversion {
                IdConversion::Widen => value.as_i64().ok_or_else(|| self.unexpected(field)),
                IdConversion::Guid => match value {
                    Value::Guid(g) => Ok(guid_to_id(g)),
                    _ => Err(self.unexpected(field)),
                },
                IdConversion::String => match value {
                    Value::String(s) => Ok(string_to_id(s)),
                    _ => Err(self.unexpected(field)),
                },
            };
        }

        let mut hasher = domain_hasher(COMPOSITE_DOMAIN);
        for field in &self.fields {
            let value = self.value_of(instance, field)?;
            hasher.update(field.name.as_bytes());
            hasher.update(b"=");
            match (field.conversion, value) {
                (IdConversion::Widen, v) => {
                    let widened = v.as_i64().ok_or_else(|| self.unexpected(field))?;
                    hasher.update(&widened.to_le_bytes());
                }
                (IdConversion::Guid, Value::Guid(g)) => {
                    hasher.update(g.as_bytes());
                }
                (IdConversion::String, Value::String(s)) => {
                    hasher.update(&(s.len() as u64).to_le_bytes());
                    hasher.update(s.as_bytes());
                }
                _ => return Err(self.unexpected(field)),
            }
            hasher.update(b";");
        }
        Ok(finish(&hasher))
    }

    /// Write `id` into a single integer ID field. Composite or hashed IDs
    /// cannot be inverted and return `false`.
    pub fn assign_id(&self, instance: &mut Instance, id: i64) -> bool {
        let [field] = self.fields.as_slice() else {
            return false;
        };
        if field.conversion != IdConversion::Widen || field.kind == FieldKind::Bool {
            return false;
        }
        match (Value::integer(field.kind, id), instance.values.get_mut(field.index)) {
            (Some(value), Some(slot)) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    fn value_of<'a>(&self, instance: &'a Instance, field: &IdField) -> IdResult<&'a Value> {
        instance
            .values
            .get(field.index)
            .ok_or_else(|| self.unexpected(field))
    }

    fn unexpected(&self, field: &IdField) -> IdError {
        IdError::UnexpectedValue {
            class: self.class.clone(),
            field: field.name.clone(),
            kind: field.kind,
        }
    }
}
