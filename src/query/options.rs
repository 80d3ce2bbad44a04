//! Parsed system query options.

use super::expr::{FilterExpr, OrderByItem};

/// One `$expand` entry, with the options nested inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandItem {
    /// Navigation property name.
    pub navigation: String,
    pub nested: Option<ExpandOption>,
}

/// `$expand`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOption {
    pub items: Vec<ExpandItem>,
}

impl ExpandOption {
    /// Expand the named navigations one level deep.
    pub fn of(navigations: &[&str]) -> Self {
        Self {
            items: navigations
                .iter()
                .map(|n| ExpandItem {
                    navigation: n.to_string(),
                    nested: None,
                })
                .collect(),
        }
    }

    /// Expand `navigation` and, inside it, `nested`.
    pub fn with_nested(mut self, navigation: &str, nested: ExpandOption) -> Self {
        self.items.push(ExpandItem {
            navigation: navigation.into(),
            nested: Some(nested),
        });
        self
    }

    pub fn find(&self, navigation: &str) -> Option<&ExpandItem> {
        self.items.iter().find(|i| i.navigation == navigation)
    }

    pub fn names(&self, navigation: &str) -> bool {
        self.find(navigation).is_some()
    }
}

/// System query options of one request.
///
/// `default_skip` and `default_top` decide who slices the result list: when
/// set (the default), the read pipeline applies `$skip`/`$top` in memory;
/// when cleared, the values are pushed down to the backend as a page
/// request and the pipeline leaves the list alone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct QueryOptions {
    pub filter: Option<FilterExpr>,
    pub order_by: Vec<OrderByItem>,
    pub select: Vec<String>,
    pub expand: Option<ExpandOption>,
    pub skip: Option<usize>,
    pub top: Option<usize>,
    pub count: bool,
    pub default_skip: bool,
    pub default_top: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            select: Vec::new(),
            expand: None,
            skip: None,
            top: None,
            count: false,
            default_skip: true,
            default_top: true,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, item: OrderByItem) -> Self {
        self.order_by.push(item);
        self
    }

    pub fn with_select(mut self, properties: &[&str]) -> Self {
        self.select = properties.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_expand(mut self, expand: ExpandOption) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// Push `$skip` down to the backend.
    pub fn delegate_skip(mut self) -> Self {
        self.default_skip = false;
        self
    }

    /// Push `$top` down to the backend.
    pub fn delegate_top(mut self) -> Self {
        self.default_top = false;
        self
    }

    pub fn skip_or_zero(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    /// Whether any paging is pushed down to the backend.
    pub fn is_delegated(&self) -> bool {
        !self.default_skip || !self.default_top
    }
}
