//! Marshalling errors.

use crate::schema::SchemaError;

/// A record could not be mapped to or from its wire form.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    #[error("Type {0} carries neither an entity type nor a complex type tag")]
    NotStructured(String),

    #[error("Field {owner}.{field} expects {expected}, found {found}")]
    ValueMismatch {
        owner: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("Unknown member {member} of enum {enum_type}")]
    UnknownEnumMember { enum_type: String, member: String },

    #[error("Enum {enum_type} has no member with ordinal {ordinal}")]
    UnknownEnumOrdinal { enum_type: String, ordinal: i64 },

    #[error("Field {owner}.{field} is a collection of a type that cannot be collected")]
    IllegalCollection { owner: String, field: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type MarshalResult<T> = Result<T, MarshalError>;
