//! Query translation errors.

/// A filter or order expression could not be translated.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Unknown property {property} on {owner}")]
    UnknownProperty { owner: String, property: String },

    #[error("Type {type_name} referenced by {referenced_by} is not registered")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("{owner} declares no super entity to reach inherited field {field}")]
    MissingSuperEntity { owner: String, field: String },

    #[error("Unknown member {member} of enum {enum_type}")]
    UnknownEnumMember { enum_type: String, member: String },

    #[error("Invalid {kind} literal: {text}")]
    InvalidLiteral { kind: String, text: String },

    #[error("Cannot compare {path} with a {constant} value")]
    TypeMismatch { path: String, constant: String },

    #[error("Expression is not a boolean predicate: {0}")]
    NotAPredicate(String),

    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),
}

impl TranslateError {
    /// HTTP-style status for a request failing with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            TranslateError::UnsupportedPredicate(_) => 501,
            TranslateError::UnknownEntityType(_) => 500,
            _ => 400,
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
