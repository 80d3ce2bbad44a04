//! Schema compilation errors.

/// A schema element is structurally invalid.
///
/// These abort the operation that triggered them and are never converted
/// into an absent result.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Entity type {entity} declares no key")]
    EmptyKey { entity: String },

    #[error("Key {key} of entity type {entity} is not a declared property")]
    MissingKeyProperty { entity: String, key: String },

    #[error("Entity type {0} has no entity set")]
    MissingEntitySet(String),

    #[error("Entity set {0} is not attached to an entity type")]
    MissingEntityType(String),

    #[error("Type {type_name} referenced by {referenced_by} is not registered")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("Field {field} of {owner} has unrecognized type {value_type}")]
    UnrecognizedType {
        owner: String,
        field: String,
        value_type: String,
    },

    #[error("Navigation {field} of {owner} targets {target}, which is not an entity type")]
    InvalidNavigationTarget {
        owner: String,
        field: String,
        target: String,
    },

    #[error("Bound operation {0} has no entity set path")]
    MissingEntitySetPath(String),

    #[error("Entity set {name} referenced by {referenced_by} is not registered")]
    UnknownEntitySet { name: String, referenced_by: String },

    #[error("Import {import} references unknown operation {operation}")]
    UnknownOperation { import: String, operation: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
