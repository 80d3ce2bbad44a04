//! Query translation.
//!
//! Parsed `$filter`/`$orderby` trees ([`expr`]) are translated against the
//! catalog into backend predicates ([`predicate`]), then packaged with paging
//! into a [`QueryExpression`] an executor can run.

pub mod error;
pub mod expr;
pub mod factory;
pub mod options;
pub mod predicate;
pub mod translator;

pub use error::{TranslateError, TranslateResult};
pub use expr::{
    BinaryOperatorKind, FilterExpr, Literal, OrderByItem, PathSegment, UnaryOperatorKind,
};
pub use factory::{PageRequest, QueryExpression, QueryExpressionFactory};
pub use options::{ExpandItem, ExpandOption, QueryOptions};
pub use predicate::{BackendPath, CompareOp, Constant, Expr, OrderSpec, PathKind, SortDir};
pub use translator::{QueryTranslator, Translated};
