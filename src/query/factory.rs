//! Query expressions handed to executors.
//!
//! ```text
//! QueryOptions ──▶ QueryExpressionFactory ──▶ QueryExpression ──launch──▶ PredicateExecutor
//!   $filter           (QueryTranslator)         predicate                  find_all
//!   $orderby                                    order                      find_all_ordered
//!   $skip/$top                                  page (delegated only)      find_page
//! ```

use std::fmt;

use tracing::debug;

use super::error::TranslateResult;
use super::options::QueryOptions;
use super::predicate::{Expr, OrderSpec};
use super::translator::QueryTranslator;
use crate::backend::{BackendResult, PredicateExecutor};
use crate::catalog::Catalog;
use crate::marshal::Record;

/// Offset/limit page pushed down to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    pub sort: Vec<OrderSpec>,
}

impl PageRequest {
    pub fn of(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, sort: Vec<OrderSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// Sort keys as paths relative to the root variable.
    pub fn sort_properties(&self) -> Vec<String> {
        self.sort.iter().map(|s| s.path.relative()).collect()
    }
}

/// A translated query, ready to run against an executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExpression {
    pub predicate: Option<Expr>,
    pub order: Vec<OrderSpec>,
    pub page: Option<PageRequest>,
}

impl QueryExpression {
    /// Run against `executor`, choosing the paged, ordered or plain query.
    pub fn launch<E: PredicateExecutor + ?Sized>(&self, executor: &E) -> BackendResult<Vec<Record>> {
        let predicate = self.predicate.as_ref();
        match &self.page {
            Some(page) => executor.find_page(predicate, page),
            None if self.order.is_empty() => executor.find_all(predicate),
            None => executor.find_all_ordered(predicate, &self.order),
        }
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(p) => write!(f, "where {}", p)?,
            None => f.write_str("where true")?,
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(|o| o.to_string()).collect();
            write!(f, " order by {}", order.join(", "))?;
        }
        if let Some(page) = &self.page {
            write!(f, " offset {} limit {}", page.offset, page.limit)?;
        }
        Ok(())
    }
}

/// Builds [`QueryExpression`]s for one entity type.
pub struct QueryExpressionFactory<'a> {
    translator: QueryTranslator<'a>,
}

impl<'a> QueryExpressionFactory<'a> {
    pub fn new(catalog: &'a Catalog, entity_type: &str) -> TranslateResult<Self> {
        Ok(Self {
            translator: QueryTranslator::new(catalog, entity_type)?,
        })
    }

    pub fn translator(&self) -> &QueryTranslator<'a> {
        &self.translator
    }

    pub fn build(&self, options: &QueryOptions) -> TranslateResult<QueryExpression> {
        let predicate = options
            .filter
            .as_ref()
            .map(|filter| self.translator.translate_filter(filter))
            .transpose()?;

        let mut order = Vec::with_capacity(options.order_by.len());
        for item in &options.order_by {
            if let Some(spec) = self.translator.translate_order(item)? {
                order.push(spec);
            }
        }

        let page = options.is_delegated().then(|| {
            let offset = if options.default_skip {
                0
            } else {
                options.skip_or_zero()
            };
            let limit = if options.default_top {
                usize::MAX
            } else {
                options.top.unwrap_or(usize::MAX)
            };
            PageRequest::of(offset, limit).sorted_by(order.clone())
        });

        let expression = QueryExpression {
            predicate,
            order,
            page,
        };
        debug!("Built query expression: {}", expression);
        Ok(expression)
    }
}
