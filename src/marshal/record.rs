//! Domain-side values.
//!
//! A [`Record`] is the field bag a domain object hands to the marshaller,
//! keyed by host field name. Domain types convert to and from records through
//! [`Structured`], so nothing is read off values by runtime inspection.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::error::MarshalResult;
use crate::model::Describe;

/// A domain field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Enum member name.
    Enum(String),
    Complex(Record),
    Entity(Record),
    Collection(Vec<Value>),
}

impl Value {
    pub fn enumeration(member: &str) -> Self {
        Value::Enum(member.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::SByte(_) => "sbyte",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Enum(_) => "enum",
            Value::Complex(_) => "complex",
            Value::Entity(_) => "entity",
            Value::Collection(_) => "collection",
        }
    }

    /// Integer value, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::SByte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Complex(r) | Value::Entity(r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    i8 => SByte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    Decimal => Decimal,
    String => String,
    bool => Boolean,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Collection(v.into_iter().map(Into::into).collect())
    }
}

/// Field bag of one domain object, in field declaration order.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct Record {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Empty record of the registered host type `type_name`.
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields: IndexMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Value of a field; unset fields read as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A domain type that converts to and from [`Record`]s.
pub trait Structured: Describe + Sized {
    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> MarshalResult<Self>;
}
