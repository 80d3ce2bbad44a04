//! In-memory predicate executor.
//!
//! Paths are walked segment by segment through record fields. A super-entity
//! hop the record does not hold is skipped, as records may flatten inherited
//! fields. Any other missing segment reads as null, and comparisons against
//! null never match.

use std::cmp::Ordering;

use chrono::{NaiveTime, TimeZone, Utc};
use tracing::debug;

use super::{BackendResult, PredicateExecutor};
use crate::marshal::{Record, Value};
use crate::query::{BackendPath, CompareOp, Constant, Expr, OrderSpec, PageRequest, SortDir};

/// Executor over a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    records: Vec<Record>,
}

impl MemoryExecutor {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matching(&self, predicate: Option<&Expr>) -> Vec<Record> {
        let matched: Vec<Record> = self
            .records
            .iter()
            .filter(|r| predicate.map_or(true, |p| evaluate(p, r)))
            .cloned()
            .collect();
        debug!(
            "{} of {} records match {}",
            matched.len(),
            self.records.len(),
            predicate.map_or_else(|| "true".to_string(), |p| p.to_string())
        );
        matched
    }
}

impl PredicateExecutor for MemoryExecutor {
    fn find_all(&self, predicate: Option<&Expr>) -> BackendResult<Vec<Record>> {
        Ok(self.matching(predicate))
    }

    fn find_all_ordered(
        &self,
        predicate: Option<&Expr>,
        order: &[OrderSpec],
    ) -> BackendResult<Vec<Record>> {
        let mut records = self.matching(predicate);
        sort_records(&mut records, order);
        Ok(records)
    }

    fn find_page(
        &self,
        predicate: Option<&Expr>,
        page: &PageRequest,
    ) -> BackendResult<Vec<Record>> {
        let mut records = self.matching(predicate);
        sort_records(&mut records, &page.sort);
        Ok(records
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Whether `record` satisfies `expr`.
pub fn evaluate(expr: &Expr, record: &Record) -> bool {
    match expr {
        Expr::Compare { path, op, value } => {
            let field = resolve(record, path);
            compare(field, value).is_some_and(|ord| matches_op(*op, ord))
        }
        Expr::IsNull { path, negated } => {
            let is_null = resolve(record, path).map_or(true, Value::is_null);
            is_null != *negated
        }
        Expr::In { path, members } => match resolve(record, path) {
            Some(Value::Enum(name)) => members.iter().any(|m| &m.name == name),
            _ => false,
        },
        Expr::And(l, r) => evaluate(l, record) && evaluate(r, record),
        Expr::Or(l, r) => evaluate(l, record) || evaluate(r, record),
        Expr::Not(inner) => !evaluate(inner, record),
    }
}

/// Walk `path` from the record root.
fn resolve<'r>(record: &'r Record, path: &BackendPath) -> Option<&'r Value> {
    let segments = path.segments();
    let mut current = record;
    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();
        match current.get(segment) {
            Some(value) if last => return Some(value),
            Some(Value::Complex(nested) | Value::Entity(nested)) => current = nested,
            Some(_) => return None,
            // Super-entity link flattened into the record.
            None if !last && path.is_hop(i) => continue,
            None => return None,
        }
    }
    None
}

fn compare(value: Option<&Value>, constant: &Constant) -> Option<Ordering> {
    let value = value?;
    match constant {
        Constant::Int(c) => value.as_i64().map(|v| v.cmp(&i64::from(*c))),
        Constant::Long(c) => value.as_i64().map(|v| v.cmp(c)),
        Constant::Double(c) => match value {
            Value::Double(v) => v.partial_cmp(c),
            _ => None,
        },
        Constant::Decimal(c) => match value {
            Value::Decimal(v) => Some(v.cmp(c)),
            _ => None,
        },
        Constant::Boolean(c) => value.as_bool().map(|v| v.cmp(c)),
        Constant::String(c) => match value {
            Value::String(v) => Some(v.as_str().cmp(c.as_str())),
            _ => None,
        },
        Constant::Date(c) => match value {
            Value::Date(v) => Some(v.cmp(c)),
            _ => None,
        },
        Constant::DateTime(c) => match value {
            Value::DateTime(v) => Some(Utc.from_utc_datetime(v).cmp(&c.with_timezone(&Utc))),
            Value::Date(v) => {
                let midnight = Utc.from_utc_datetime(&v.and_time(NaiveTime::from_hms_opt(0, 0, 0)?));
                Some(midnight.cmp(&c.with_timezone(&Utc)))
            }
            _ => None,
        },
        Constant::EnumMembers(_) => None,
    }
}

fn matches_op(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Ne => ord != Ordering::Equal,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Ge => ord != Ordering::Less,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Le => ord != Ordering::Greater,
    }
}

// =============================================================================
// Ordering
// =============================================================================

fn sort_records(records: &mut [Record], order: &[OrderSpec]) {
    if order.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for spec in order {
            let ord = order_values(&spec.path, resolve(a, &spec.path), resolve(b, &spec.path));
            let ord = match spec.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Total order over field values; nulls sort first, unlike kinds compare equal.
/// Enum members order by declared ordinal.
fn order_values(path: &BackendPath, a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return x.cmp(&y);
            }
            match (a, b) {
                (Value::Double(x), Value::Double(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
                (Value::Decimal(x), Value::Decimal(y)) => x.cmp(y),
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (Value::Enum(x), Value::Enum(y)) => match (path.ordinal(x), path.ordinal(y)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                },
                (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
                (Value::Date(x), Value::Date(y)) => x.cmp(y),
                (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
                _ => Ordering::Equal,
            }
        }
    }
}
