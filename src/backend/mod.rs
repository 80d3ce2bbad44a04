//! Predicate executors.
//!
//! The boundary to the persistence layer. An executor runs a translated
//! [`Expr`] with optional ordering or paging and returns matching records.
//! [`MemoryExecutor`] evaluates the predicate tree over records held in memory;
//! [`RepositoryOperation`] wraps any executor as a generic entity operation.

pub mod memory;
pub mod repository;

pub use memory::MemoryExecutor;
pub use repository::RepositoryOperation;

use crate::marshal::Record;
use crate::query::{Expr, OrderSpec, PageRequest};

/// A backend query failed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend query failed: {0}")]
    Query(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Runs predicates against a store of one entity type.
///
/// Calls block the requesting thread until the store answers.
pub trait PredicateExecutor: Send + Sync {
    /// Every record matching `predicate`; all records when `None`.
    fn find_all(&self, predicate: Option<&Expr>) -> BackendResult<Vec<Record>>;

    fn find_all_ordered(
        &self,
        predicate: Option<&Expr>,
        order: &[OrderSpec],
    ) -> BackendResult<Vec<Record>>;

    /// One page of matches, sorted by the page's sort keys.
    fn find_page(&self, predicate: Option<&Expr>, page: &PageRequest)
        -> BackendResult<Vec<Record>>;
}
