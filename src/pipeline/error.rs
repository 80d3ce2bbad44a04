//! Request-boundary errors.

use serde::Serialize;

use super::operation::OperationError;
use crate::marshal::MarshalError;
use crate::query::TranslateError;
use crate::schema::SchemaError;

/// A read request failed.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unknown entity set: {0}")]
    UnknownEntitySet(String),

    #[error("Entity set {entity_set} has no navigation {navigation}")]
    UnknownNavigation {
        entity_set: String,
        navigation: String,
    },

    #[error("No entity operation registered for entity type {0}")]
    MissingOperation(String),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl RequestError {
    /// HTTP-style status for the dispatcher.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::UnknownEntitySet(_) | RequestError::UnknownNavigation { .. } => 404,
            RequestError::Translate(e) => e.status_code(),
            RequestError::Operation(OperationError::Translate(e)) => e.status_code(),
            RequestError::Operation(OperationError::InvalidKey { .. }) => 400,
            RequestError::MissingOperation(_)
            | RequestError::Operation(_)
            | RequestError::Marshal(_)
            | RequestError::Schema(_) => 500,
        }
    }

    pub fn into_failure(self) -> ProtocolFailure {
        ProtocolFailure {
            status: self.status_code(),
            message: self.to_string(),
        }
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Failure response handed back to the protocol dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolFailure {
    pub status: u16,
    pub message: String,
}
