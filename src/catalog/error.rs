//! Catalog initialization errors.

use super::Category;

/// A candidate type could not be loaded into the catalog.
///
/// Fatal: a catalog is never published after a scan error.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Candidate type has an empty name")]
    EmptyTypeName,

    #[error("Type {0} carries no recognized tag")]
    Untagged(String),

    #[error("{category} {name} is declared by both {existing} and {incoming}")]
    Conflict {
        category: Category,
        name: String,
        existing: String,
        incoming: String,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;
