//! Declarative C-ABI layout descriptions
//!
//! A `Schema` mirrors how the producer lays out a C type in memory: structs
//! are packed member after member with no implicit alignment, unions overlay
//! every member at one base offset. Any padding the producer relies on must
//! appear as an explicit `_padding` member.
//!
//! ```text
//! Struct [a: u16, b: float]   size 6   a@0  b@2
//! Union  [a: u16, b: float]   size 4   a@0  b@0
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::memory::{MemoryError, MemoryView};

/// Schema construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unimplemented C data type: {0}")]
    UnknownPrimitive(String),
}

/// Errors raised while decoding or navigating a decoded value
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("No member named '{0}'")]
    MissingMember(String),
    #[error("'{0}' is a scalar, not a struct or union")]
    NotComposite(String),
    #[error("'{0}' is a struct or union, not a scalar")]
    NotScalar(String),
}

/// Fixed-width primitive C types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Float,
    U32,
    I32,
    U16,
    I16,
    U8,
    Bool,
}

impl PrimitiveKind {
    /// Width in bytes
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Float | PrimitiveKind::U32 | PrimitiveKind::I32 => 4,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::U8 | PrimitiveKind::Bool => 1,
        }
    }

    /// C spelling used by the producer's headers
    pub const fn c_name(self) -> &'static str {
        match self {
            PrimitiveKind::Float => "float",
            PrimitiveKind::U32 => "uint32_t",
            PrimitiveKind::I32 => "int32_t",
            PrimitiveKind::U16 => "uint16_t",
            PrimitiveKind::I16 => "int16_t",
            PrimitiveKind::U8 => "uint8_t",
            PrimitiveKind::Bool => "bool",
        }
    }

    fn read(self, view: &MemoryView<'_>, offset: usize) -> Result<Scalar, MemoryError> {
        Ok(match self {
            PrimitiveKind::Float => Scalar::Float(view.f32(offset)?),
            PrimitiveKind::U32 => Scalar::U32(view.u32(offset)?),
            PrimitiveKind::I32 => Scalar::I32(view.i32(offset)?),
            PrimitiveKind::U16 => Scalar::U16(view.u16(offset)?),
            PrimitiveKind::I16 => Scalar::I16(view.i16(offset)?),
            PrimitiveKind::U8 => Scalar::U8(view.u8(offset)?),
            PrimitiveKind::Bool => Scalar::Bool(view.bool(offset)?),
        })
    }
}

impl FromStr for PrimitiveKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(PrimitiveKind::Float),
            "uint32_t" => Ok(PrimitiveKind::U32),
            "int32_t" => Ok(PrimitiveKind::I32),
            "uint16_t" => Ok(PrimitiveKind::U16),
            "int16_t" => Ok(PrimitiveKind::I16),
            "uint8_t" => Ok(PrimitiveKind::U8),
            "bool" => Ok(PrimitiveKind::Bool),
            other => Err(SchemaError::UnknownPrimitive(other.to_string())),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

/// A named struct or union member
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: &'static str,
    pub schema: Schema,
}

/// Binary layout description
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Struct(Vec<Member>),
    Union(Vec<Member>),
    Primitive(PrimitiveKind),
}

impl Schema {
    pub fn structure<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        Schema::Struct(Self::members(members))
    }

    pub fn union<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        Schema::Union(Self::members(members))
    }

    /// Primitive from its C type name.
    ///
    /// # Panics
    ///
    /// Panics on an unknown type name.
    pub fn primitive(c_name: &str) -> Self {
        match c_name.parse::<PrimitiveKind>() {
            Ok(kind) => Schema::Primitive(kind),
            Err(e) => panic!("invalid schema: {}", e),
        }
    }

    fn members<I>(members: I) -> Vec<Member>
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        members
            .into_iter()
            .map(|(name, schema)| Member { name, schema })
            .collect()
    }

    /// Total byte size, computed structurally
    pub fn size(&self) -> usize {
        match self {
            Schema::Struct(members) => members.iter().map(|m| m.schema.size()).sum(),
            Schema::Union(members) => members.iter().map(|m| m.schema.size()).max().unwrap_or(0),
            Schema::Primitive(kind) => kind.size(),
        }
    }

    /// Byte offset of a direct member relative to the start of this type
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        match self {
            Schema::Struct(members) => {
                let mut cursor = 0;
                for member in members {
                    if member.name == name {
                        return Some(cursor);
                    }
                    cursor += member.schema.size();
                }
                None
            }
            Schema::Union(members) => members.iter().any(|m| m.name == name).then_some(0),
            Schema::Primitive(_) => None,
        }
    }

    /// Decode a value of this type at `offset`
    pub fn read<'s>(
        &'s self,
        view: &MemoryView<'_>,
        offset: usize,
    ) -> Result<DecodedValue<'s>, MemoryError> {
        match self {
            Schema::Primitive(kind) => Ok(DecodedValue::Scalar {
                value: kind.read(view, offset)?,
                size: kind.size(),
            }),
            Schema::Struct(members) => {
                let mut cursor = offset;
                let mut decoded = Vec::with_capacity(members.len());
                for member in members {
                    let value = member.schema.read(view, cursor)?;
                    cursor += value.size();
                    decoded.push((member.name, value));
                }
                Ok(DecodedValue::Composite {
                    members: decoded,
                    size: cursor - offset,
                })
            }
            Schema::Union(members) => {
                let mut size = 0;
                let mut decoded = Vec::with_capacity(members.len());
                for member in members {
                    let value = member.schema.read(view, offset)?;
                    size = size.max(value.size());
                    decoded.push((member.name, value));
                }
                Ok(DecodedValue::Composite {
                    members: decoded,
                    size,
                })
            }
        }
    }
}

/// A decoded primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f32),
    U32(u32),
    I32(i32),
    U16(u16),
    I16(i16),
    U8(u8),
    Bool(bool),
}

impl Scalar {
    pub fn as_f32(self) -> f32 {
        match self {
            Scalar::Float(v) => v,
            Scalar::U32(v) => v as f32,
            Scalar::I32(v) => v as f32,
            Scalar::U16(v) => v as f32,
            Scalar::I16(v) => v as f32,
            Scalar::U8(v) => v as f32,
            Scalar::Bool(v) => u8::from(v) as f32,
        }
    }

    /// Integer value reinterpreted as `u32` (signed values are sign-extended)
    pub fn as_u32(self) -> u32 {
        match self {
            Scalar::Float(v) => v as u32,
            Scalar::U32(v) => v,
            Scalar::I32(v) => v as u32,
            Scalar::U16(v) => v as u32,
            Scalar::I16(v) => v as i32 as u32,
            Scalar::U8(v) => v as u32,
            Scalar::Bool(v) => u32::from(v),
        }
    }

    pub fn as_bool(self) -> bool {
        match self {
            Scalar::Bool(v) => v,
            other => other.as_u32() != 0,
        }
    }
}

/// Result of applying a `Schema` at an offset.
///
/// Member names borrow from the schema, so decoding allocates only the
/// member vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue<'s> {
    Scalar {
        value: Scalar,
        size: usize,
    },
    Composite {
        members: Vec<(&'s str, DecodedValue<'s>)>,
        size: usize,
    },
}

impl<'s> DecodedValue<'s> {
    /// Bytes covered by this value
    pub fn size(&self) -> usize {
        match self {
            DecodedValue::Scalar { size, .. } | DecodedValue::Composite { size, .. } => *size,
        }
    }

    /// Direct member lookup
    pub fn get(&self, name: &str) -> Result<&DecodedValue<'s>, DecodeError> {
        match self {
            DecodedValue::Composite { members, .. } => members
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| DecodeError::MissingMember(name.to_string())),
            DecodedValue::Scalar { .. } => Err(DecodeError::NotComposite(name.to_string())),
        }
    }

    /// Dotted-path lookup, e.g. `"renderData.text.textColor.r"`
    pub fn path(&self, path: &str) -> Result<&DecodedValue<'s>, DecodeError> {
        path.split('.').try_fold(self, |value, name| value.get(name))
    }

    pub fn scalar(&self) -> Option<Scalar> {
        match self {
            DecodedValue::Scalar { value, .. } => Some(*value),
            DecodedValue::Composite { .. } => None,
        }
    }

    fn scalar_at(&self, path: &str) -> Result<Scalar, DecodeError> {
        self.path(path)?
            .scalar()
            .ok_or_else(|| DecodeError::NotScalar(path.to_string()))
    }

    pub fn f32_at(&self, path: &str) -> Result<f32, DecodeError> {
        self.scalar_at(path).map(Scalar::as_f32)
    }

    pub fn u32_at(&self, path: &str) -> Result<u32, DecodeError> {
        self.scalar_at(path).map(Scalar::as_u32)
    }

    pub fn bool_at(&self, path: &str) -> Result<bool, DecodeError> {
        self.scalar_at(path).map(Scalar::as_bool)
    }
}
