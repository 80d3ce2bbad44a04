//! Wire-side representation handed to the serializer.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A primitive wire value. Temporal values travel as calendar instants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Boolean(bool),
    Calendar(DateTime<Utc>),
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::SByte(v) => write!(f, "{}", v),
            PrimitiveValue::Int16(v) => write!(f, "{}", v),
            PrimitiveValue::Int32(v) => write!(f, "{}", v),
            PrimitiveValue::Int64(v) => write!(f, "{}", v),
            PrimitiveValue::Double(v) => write!(f, "{}", v),
            PrimitiveValue::Decimal(v) => write!(f, "{}", v),
            PrimitiveValue::String(v) => f.write_str(v),
            PrimitiveValue::Boolean(v) => write!(f, "{}", v),
            PrimitiveValue::Calendar(v) => f.write_str(&v.to_rfc3339()),
        }
    }
}

/// A complex value: the properties of a nested structured object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireComplex {
    pub type_name: String,
    pub properties: Vec<WireProperty>,
}

/// A property value, shaped by the declared field type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Null,
    Primitive(PrimitiveValue),
    /// Enum member ordinal.
    Enum(i64),
    Complex(WireComplex),
    Collection(Vec<WireValue>),
}

impl WireValue {
    /// Text of the value inside an entity id, if it can appear there.
    pub fn key_text(&self) -> Option<String> {
        match self {
            WireValue::Primitive(p) => Some(p.to_string()),
            WireValue::Enum(ordinal) => Some(ordinal.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    Primitive,
    Enum,
    Complex,
    CollectionPrimitive,
    CollectionEnum,
    CollectionComplex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProperty {
    pub name: String,
    /// Protocol type, e.g. `Edm.Int32` or `Collection(ns.Address)`.
    pub type_name: String,
    pub kind: ValueKind,
    pub value: WireValue,
}

/// Inlined content of an expanded navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WireInline {
    Entity(Box<WireEntity>),
    EntitySet(Vec<WireEntity>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLink {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub inline: WireInline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEntity {
    pub type_name: String,
    /// `<EntitySet>(<Key>=<value>,...)`; absent for complex values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: Vec<WireProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub navigation_links: Vec<WireLink>,
}

impl WireEntity {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            id: None,
            properties: Vec::new(),
            navigation_links: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&WireProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn link(&self, title: &str) -> Option<&WireLink> {
        self.navigation_links.iter().find(|l| l.title == title)
    }
}

/// One page of a collection read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCollection {
    pub entities: Vec<WireEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}
