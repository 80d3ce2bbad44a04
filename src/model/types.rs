//! Primitive kinds and the declared value types of descriptor fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol primitive kinds understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    SByte,
    Int16,
    Int32,
    Int64,
    Double,
    Decimal,
    String,
    Boolean,
    Date,
    DateTimeOffset,
}

impl PrimitiveKind {
    /// The `Edm.*` name of this kind.
    pub fn edm_name(&self) -> &'static str {
        match self {
            PrimitiveKind::SByte => "Edm.SByte",
            PrimitiveKind::Int16 => "Edm.Int16",
            PrimitiveKind::Int32 => "Edm.Int32",
            PrimitiveKind::Int64 => "Edm.Int64",
            PrimitiveKind::Double => "Edm.Double",
            PrimitiveKind::Decimal => "Edm.Decimal",
            PrimitiveKind::String => "Edm.String",
            PrimitiveKind::Boolean => "Edm.Boolean",
            PrimitiveKind::Date => "Edm.Date",
            PrimitiveKind::DateTimeOffset => "Edm.DateTimeOffset",
        }
    }

    /// Parse an `Edm.*` name.
    pub fn from_edm_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Edm.SByte" => PrimitiveKind::SByte,
            "Edm.Int16" => PrimitiveKind::Int16,
            "Edm.Int32" => PrimitiveKind::Int32,
            "Edm.Int64" => PrimitiveKind::Int64,
            "Edm.Double" => PrimitiveKind::Double,
            "Edm.Decimal" => PrimitiveKind::Decimal,
            "Edm.String" => PrimitiveKind::String,
            "Edm.Boolean" => PrimitiveKind::Boolean,
            "Edm.Date" => PrimitiveKind::Date,
            "Edm.DateTimeOffset" => PrimitiveKind::DateTimeOffset,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, PrimitiveKind::Date | PrimitiveKind::DateTimeOffset)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.edm_name())
    }
}

/// The declared type of a field, fixed at registration time.
///
/// Structured and enum variants carry the *registered type name* of the
/// target descriptor, never a reference to it. Targets are looked up in the
/// catalog when needed, which keeps cyclic navigation graphs ownership-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Primitive(PrimitiveKind),
    Enum(String),
    Complex(String),
    Entity(String),
    Collection(Box<ValueType>),
    /// A host type with no protocol mapping.
    Opaque(String),
}

impl ValueType {
    pub fn collection(element: ValueType) -> Self {
        ValueType::Collection(Box::new(element))
    }

    pub fn enumeration(type_name: impl Into<String>) -> Self {
        ValueType::Enum(type_name.into())
    }

    pub fn complex(type_name: impl Into<String>) -> Self {
        ValueType::Complex(type_name.into())
    }

    pub fn entity(type_name: impl Into<String>) -> Self {
        ValueType::Entity(type_name.into())
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ValueType::Collection(_))
    }

    /// The element type for collections, `self` otherwise.
    pub fn element(&self) -> &ValueType {
        match self {
            ValueType::Collection(inner) => inner.element(),
            other => other,
        }
    }

    /// Registered type name of an enum/complex/entity element.
    pub fn target_name(&self) -> Option<&str> {
        match self.element() {
            ValueType::Enum(name) | ValueType::Complex(name) | ValueType::Entity(name) => {
                Some(name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Primitive(kind) => write!(f, "{}", kind),
            ValueType::Enum(name) => write!(f, "enum {}", name),
            ValueType::Complex(name) => write!(f, "complex {}", name),
            ValueType::Entity(name) => write!(f, "entity {}", name),
            ValueType::Collection(inner) => write!(f, "collection of {}", inner),
            ValueType::Opaque(name) => write!(f, "{}", name),
        }
    }
}

// Shorthand constructors for primitive value types.

pub fn int32() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Int32)
}

pub fn int64() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Int64)
}

pub fn string() -> ValueType {
    ValueType::Primitive(PrimitiveKind::String)
}

pub fn boolean() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Boolean)
}

pub fn double() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Double)
}

pub fn decimal() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Decimal)
}

pub fn date() -> ValueType {
    ValueType::Primitive(PrimitiveKind::Date)
}

pub fn date_time() -> ValueType {
    ValueType::Primitive(PrimitiveKind::DateTimeOffset)
}
