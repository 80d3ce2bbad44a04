//! Entity operation handlers.
//!
//! One [`EntityOperation`] serves each entity type. The pipeline looks it up
//! in the [`OperationRegistry`] by entity type name and hands it an
//! [`OperationContext`] bound to the current catalog snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::backend::BackendError;
use crate::catalog::Catalog;
use crate::marshal::{MarshalError, Record};
use crate::model::TypeDescriptor;
use crate::query::{QueryExpression, QueryExpressionFactory, QueryOptions, TranslateError};

/// One `Name=value` key predicate, with the value as written in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPredicate {
    pub name: String,
    pub text: String,
}

impl KeyPredicate {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// An operation handler failed.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Invalid key {key} for entity type {entity}")]
    InvalidKey { entity: String, key: String },

    #[error("Operation failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

pub type OperationResult<T> = Result<T, OperationError>;

/// Per-request view handed to an operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    catalog: &'a Catalog,
    entity_type: &'a TypeDescriptor,
}

impl<'a> OperationContext<'a> {
    pub fn new(catalog: &'a Catalog, entity_type: &'a TypeDescriptor) -> Self {
        Self {
            catalog,
            entity_type,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn descriptor(&self) -> &'a TypeDescriptor {
        self.entity_type
    }

    pub fn entity_type_name(&self) -> &'a str {
        self.entity_type
            .entity_type_name()
            .unwrap_or(&self.entity_type.type_name)
    }

    /// Translate `options` into an expression for this entity type.
    pub fn query_expression(&self, options: &QueryOptions) -> OperationResult<QueryExpression> {
        let factory = QueryExpressionFactory::new(self.catalog, self.entity_type_name())?;
        Ok(factory.build(options)?)
    }
}

/// Read handler for one entity type.
///
/// `parent` is the record the request navigated from, if any.
pub trait EntityOperation: Send + Sync {
    /// Entity type name this handler serves.
    fn for_entity(&self) -> &str;

    fn retrieve_all(
        &self,
        ctx: &OperationContext<'_>,
        options: &QueryOptions,
        parent: Option<&Record>,
    ) -> OperationResult<Vec<Record>>;

    /// The entity matching every key predicate, if any.
    fn retrieve_by_key(
        &self,
        ctx: &OperationContext<'_>,
        keys: &[KeyPredicate],
        options: &QueryOptions,
        parent: Option<&Record>,
    ) -> OperationResult<Option<Record>>;

    /// Total matches of `options`' filter, when the handler can count them.
    fn count(
        &self,
        _ctx: &OperationContext<'_>,
        _options: &QueryOptions,
    ) -> OperationResult<Option<i64>> {
        Ok(None)
    }
}

/// Handlers by entity type name.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn EntityOperation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its [`EntityOperation::for_entity`] name.
    pub fn register(&mut self, operation: Arc<dyn EntityOperation>) {
        let name = operation.for_entity().to_string();
        debug!("Entity operation registered for {}", name);
        self.operations.insert(name, operation);
    }

    pub fn with(mut self, operation: impl EntityOperation + 'static) -> Self {
        self.register(Arc::new(operation));
        self
    }

    pub fn get(&self, entity_type: &str) -> Option<&Arc<dyn EntityOperation>> {
        self.operations.get(entity_type)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.operations.keys().collect();
        names.sort();
        f.debug_struct("OperationRegistry")
            .field("operations", &names)
            .finish()
    }
}
