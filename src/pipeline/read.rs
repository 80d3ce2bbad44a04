//! Read pipeline.
//!
//! ```text
//! CollectionRequest
//!   │ resolve entity set ─▶ entity type ─▶ EntityOperation
//!   │ retrieve_all (filter/order translated by the operation)
//!   │ $count   (before paging)
//!   │ $skip    (unless delegated)
//!   │ page     min($top, max_page_size)
//!   │ nextLink when min(remaining, $top) > page
//!   ▼ EntityMarshaller ─▶ WireCollection
//! ```

use std::sync::Arc;

use tracing::debug;

use super::error::{RequestError, RequestResult};
use super::link::next_link;
use super::operation::{EntityOperation, KeyPredicate, OperationContext, OperationRegistry};
use crate::catalog::Catalog;
use crate::marshal::{EntityMarshaller, WireCollection, WireEntity};
use crate::model::TypeDescriptor;
use crate::query::QueryOptions;
use crate::schema::{SchemaCompiler, SchemaError};

/// Page-size ceiling and which slicing the backend takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingPolicy {
    pub max_page_size: usize,
    /// `$skip` is applied by the backend; the pipeline does not slice.
    pub delegate_skip: bool,
    /// `$top` is applied by the backend; the pipeline does not slice.
    pub delegate_top: bool,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            delegate_skip: false,
            delegate_top: false,
        }
    }
}

impl PagingPolicy {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            max_page_size,
            ..Self::default()
        }
    }

    pub fn delegating_skip(mut self) -> Self {
        self.delegate_skip = true;
        self
    }

    pub fn delegating_top(mut self) -> Self {
        self.delegate_top = true;
        self
    }

    /// Effective page size: `$top` clamped to the ceiling, else the ceiling.
    pub fn page_size(&self, top: Option<usize>) -> usize {
        top.map_or(self.max_page_size, |t| t.min(self.max_page_size))
    }
}

/// A collection read as handed over by the dispatcher.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct CollectionRequest {
    pub entity_set: String,
    pub options: QueryOptions,
    /// Request path without the query, e.g. `/odata/Students`.
    pub request_path: String,
    /// Raw query string without the leading `?`.
    pub query_string: Option<String>,
}

impl CollectionRequest {
    pub fn new(entity_set: &str, options: QueryOptions) -> Self {
        Self {
            entity_set: entity_set.to_string(),
            options,
            request_path: entity_set.to_string(),
            query_string: None,
        }
    }

    pub fn with_request(mut self, request_path: &str, query_string: Option<&str>) -> Self {
        self.request_path = request_path.to_string();
        self.query_string = query_string.map(str::to_string);
        self
    }
}

/// Serves reads against one catalog snapshot.
pub struct ReadPipeline<'a> {
    catalog: &'a Catalog,
    operations: &'a OperationRegistry,
    paging: PagingPolicy,
}

impl<'a> ReadPipeline<'a> {
    pub fn new(catalog: &'a Catalog, operations: &'a OperationRegistry) -> Self {
        Self {
            catalog,
            operations,
            paging: PagingPolicy::new(catalog.max_page_size()),
        }
    }

    pub fn with_paging(mut self, paging: PagingPolicy) -> Self {
        self.paging = paging;
        self
    }

    pub fn paging(&self) -> PagingPolicy {
        self.paging
    }

    /// Entity type and operation behind an entity set.
    fn resolve(
        &self,
        entity_set: &str,
    ) -> RequestResult<(&'a TypeDescriptor, &'a Arc<dyn EntityOperation>)> {
        let desc = self
            .catalog
            .entity_set(entity_set)
            .ok_or_else(|| RequestError::UnknownEntitySet(entity_set.to_string()))?;
        let entity_type = desc
            .entity_type_name()
            .ok_or_else(|| SchemaError::MissingEntityType(entity_set.to_string()))?;
        let operation = self
            .operations
            .get(entity_type)
            .ok_or_else(|| RequestError::MissingOperation(entity_type.to_string()))?;
        Ok((desc, operation))
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub fn read_collection(&self, request: &CollectionRequest) -> RequestResult<WireCollection> {
        let (desc, operation) = self.resolve(&request.entity_set)?;
        let ctx = OperationContext::new(self.catalog, desc);

        let mut options = request.options.clone();
        options.default_skip = options.default_skip && !self.paging.delegate_skip;
        options.default_top = options.default_top && !self.paging.delegate_top;
        let page_size = self.paging.page_size(options.top);

        let mut records = operation.retrieve_all(&ctx, &options, None)?;
        debug!(
            "{} records retrieved from {}",
            records.len(),
            request.entity_set
        );

        let count = if !options.count {
            None
        } else if !options.is_delegated() {
            Some(records.len() as i64)
        } else {
            Some(
                operation
                    .count(&ctx, &options)?
                    .unwrap_or(records.len() as i64),
            )
        };

        let skip = options.skip_or_zero();
        if options.default_skip {
            records.drain(..skip.min(records.len()));
        }

        let remaining = records.len();
        let requested = options.top.unwrap_or(usize::MAX);
        let next = (remaining.min(requested) > page_size).then(|| {
            next_link(
                &request.request_path,
                request.query_string.as_deref(),
                skip + page_size,
            )
        });
        records.truncate(page_size);

        let marshaller = EntityMarshaller::new(self.catalog);
        let expand = options.expand.as_ref();
        let entities = records
            .iter()
            .map(|r| marshaller.to_wire_entity(r, expand))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "{} entities of {} returned, next link: {:?}",
            entities.len(),
            request.entity_set,
            next
        );
        Ok(WireCollection {
            entities,
            count,
            next_link: next,
        })
    }

    // =========================================================================
    // Single entities
    // =========================================================================

    /// `Set(key)`. `Ok(None)` when no entity matches.
    pub fn read_entity(
        &self,
        entity_set: &str,
        keys: &[KeyPredicate],
        options: &QueryOptions,
    ) -> RequestResult<Option<WireEntity>> {
        let (desc, operation) = self.resolve(entity_set)?;
        let ctx = OperationContext::new(self.catalog, desc);
        let Some(record) = operation.retrieve_by_key(&ctx, keys, options, None)? else {
            return Ok(None);
        };
        let entity = EntityMarshaller::new(self.catalog)
            .to_wire_entity(&record, options.expand.as_ref())?;
        Ok(Some(entity))
    }

    /// `Set(key)/Navigation(key)`: the parent is read first and handed to the
    /// target's operation.
    pub fn read_navigation(
        &self,
        entity_set: &str,
        keys: &[KeyPredicate],
        navigation: &str,
        target_keys: &[KeyPredicate],
        options: &QueryOptions,
    ) -> RequestResult<Option<WireEntity>> {
        let (desc, operation) = self.resolve(entity_set)?;
        let ctx = OperationContext::new(self.catalog, desc);
        let Some(parent) = operation.retrieve_by_key(&ctx, keys, &QueryOptions::new(), None)?
        else {
            return Ok(None);
        };

        let compiler = SchemaCompiler::new(self.catalog);
        let set = compiler
            .resolve_entity_set(&self.catalog.container_fqn(), entity_set)?
            .ok_or_else(|| RequestError::UnknownEntitySet(entity_set.to_string()))?;
        let target_set = set
            .binding_target(navigation)
            .ok_or_else(|| RequestError::UnknownNavigation {
                entity_set: entity_set.to_string(),
                navigation: navigation.to_string(),
            })?;
        debug!("Navigation {}/{} targets {}", entity_set, navigation, target_set);

        let (target_desc, target_operation) = self.resolve(target_set)?;
        let target_ctx = OperationContext::new(self.catalog, target_desc);
        let Some(record) =
            target_operation.retrieve_by_key(&target_ctx, target_keys, options, Some(&parent))?
        else {
            return Ok(None);
        };
        let entity = EntityMarshaller::new(self.catalog)
            .to_wire_entity(&record, options.expand.as_ref())?;
        Ok(Some(entity))
    }
}
