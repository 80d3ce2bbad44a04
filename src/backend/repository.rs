//! Generic entity operation over a predicate executor.

use tracing::debug;

use super::PredicateExecutor;
use crate::marshal::{Record, Value};
use crate::model::ValueType;
use crate::pipeline::{
    EntityOperation, KeyPredicate, OperationContext, OperationError, OperationResult,
};
use crate::query::expr::{lit, prop};
use crate::query::{FilterExpr, QueryOptions, QueryTranslator};

/// Serves one entity type straight from an executor.
///
/// `retrieve_all` runs the translated query; `retrieve_by_key` filters on the
/// key properties, restricted to records the parent references when the
/// request navigated from one.
#[derive(Debug)]
pub struct RepositoryOperation<E> {
    entity_type: String,
    executor: E,
}

impl<E: PredicateExecutor> RepositoryOperation<E> {
    pub fn new(entity_type: &str, executor: E) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            executor,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// `Key1 eq v1 and Key2 eq v2 ...`, typed by the key properties.
    fn key_filter(
        &self,
        ctx: &OperationContext<'_>,
        keys: &[KeyPredicate],
    ) -> OperationResult<FilterExpr> {
        let desc = ctx.descriptor();
        let invalid = |key: &str| OperationError::InvalidKey {
            entity: self.entity_type.clone(),
            key: key.to_string(),
        };

        let mut filter: Option<FilterExpr> = None;
        for key in keys {
            let field = desc.find_field(&key.name).ok_or_else(|| invalid(&key.name))?;
            let ValueType::Primitive(kind) = field.value_type else {
                return Err(invalid(&key.name));
            };
            let clause = prop(&key.name).eq(lit(&key.text, kind));
            filter = Some(match filter {
                Some(f) => f.and(clause),
                None => clause,
            });
        }
        filter.ok_or_else(|| invalid(""))
    }
}

impl<E: PredicateExecutor> EntityOperation for RepositoryOperation<E> {
    fn for_entity(&self) -> &str {
        &self.entity_type
    }

    fn retrieve_all(
        &self,
        ctx: &OperationContext<'_>,
        options: &QueryOptions,
        _parent: Option<&Record>,
    ) -> OperationResult<Vec<Record>> {
        let expression = ctx.query_expression(options)?;
        Ok(expression.launch(&self.executor)?)
    }

    fn retrieve_by_key(
        &self,
        ctx: &OperationContext<'_>,
        keys: &[KeyPredicate],
        _options: &QueryOptions,
        parent: Option<&Record>,
    ) -> OperationResult<Option<Record>> {
        let filter = self.key_filter(ctx, keys)?;
        let predicate = QueryTranslator::for_descriptor(ctx.catalog(), ctx.descriptor())
            .translate_filter(&filter)?;
        let found = self.executor.find_all(Some(&predicate))?.into_iter().next();

        let Some(record) = found else {
            return Ok(None);
        };
        if let Some(parent) = parent {
            if !references(parent, &record, keys, ctx) {
                debug!(
                    "{} is not reachable from parent {}",
                    self.entity_type,
                    parent.type_name()
                );
                return Ok(None);
            }
        }
        Ok(Some(record))
    }

    fn count(
        &self,
        ctx: &OperationContext<'_>,
        options: &QueryOptions,
    ) -> OperationResult<Option<i64>> {
        let expression = ctx.query_expression(options)?;
        let matched = self.executor.find_all(expression.predicate.as_ref())?;
        Ok(Some(matched.len() as i64))
    }
}

/// Whether `parent` holds an entity equal to `record` on every key field.
fn references(
    parent: &Record,
    record: &Record,
    keys: &[KeyPredicate],
    ctx: &OperationContext<'_>,
) -> bool {
    let desc = ctx.descriptor();
    let same_keys = |candidate: &Record| {
        candidate.type_name() == record.type_name()
            && keys.iter().all(|key| {
                desc.find_field(&key.name)
                    .is_some_and(|f| candidate.get(&f.name) == record.get(&f.name))
            })
    };

    parent.fields().any(|(_, value)| match value {
        Value::Entity(candidate) => same_keys(candidate),
        Value::Collection(items) => items.iter().any(|item| match item {
            Value::Entity(candidate) => same_keys(candidate),
            _ => false,
        }),
        _ => false,
    })
}
