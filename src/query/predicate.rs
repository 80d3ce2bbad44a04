//! Backend-neutral predicate tree.
//!
//! The translator's output: typed comparisons over [`BackendPath`]s, combined
//! with boolean connectives. Executors evaluate it; nothing here knows about
//! the protocol grammar.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use std::fmt;

use crate::model::EnumMember;

// =============================================================================
// Paths
// =============================================================================

/// What a backend path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Int,
    Long,
    Double,
    Decimal,
    String,
    Boolean,
    Date,
    DateTime,
    Enum,
    Complex,
    Entity,
}

/// A property path over the backend model: `student.parent.child.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPath {
    root: String,
    /// Backend entity owning the last segment.
    entity: String,
    segments: Vec<String>,
    /// Positions in `segments` that are super-entity hops.
    hops: Vec<usize>,
    kind: PathKind,
    /// Declared members of an enum path, for ordinal comparison.
    members: Vec<EnumMember>,
}

impl BackendPath {
    pub fn root(variable: &str, entity: &str) -> Self {
        Self {
            root: variable.into(),
            entity: entity.into(),
            segments: Vec::new(),
            hops: Vec::new(),
            kind: PathKind::Entity,
            members: Vec::new(),
        }
    }

    /// Extend by one dotted name, which may itself contain dots.
    pub fn child(mut self, name: &str) -> Self {
        self.segments.extend(
            name.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Extend by a super-entity link. Stores may flatten it away.
    pub fn hop(mut self, super_entity: &str) -> Self {
        let start = self.segments.len();
        self = self.child(super_entity);
        self.hops.extend(start..self.segments.len());
        self
    }

    pub fn with_members(mut self, members: Vec<EnumMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_kind(mut self, kind: PathKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_entity(mut self, entity: &str) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn variable(&self) -> &str {
        &self.root
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn is_hop(&self, position: usize) -> bool {
        self.hops.contains(&position)
    }

    /// Ordinal of an enum member of this path.
    pub fn ordinal(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|m| m.name == member)
            .map(|m| m.ordinal)
    }

    /// Path relative to the root variable.
    pub fn relative(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for BackendPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

// =============================================================================
// Constants
// =============================================================================

/// A typed constant operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    Boolean(bool),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    EnumMembers(Vec<EnumMember>),
}

impl Constant {
    pub fn type_label(&self) -> &'static str {
        match self {
            Constant::Int(_) => "integer",
            Constant::Long(_) => "long",
            Constant::Double(_) => "double",
            Constant::Decimal(_) => "decimal",
            Constant::Boolean(_) => "boolean",
            Constant::String(_) => "string",
            Constant::Date(_) => "date",
            Constant::DateTime(_) => "datetime",
            Constant::EnumMembers(_) => "enum",
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}", v),
            Constant::Double(v) => write!(f, "{}", v),
            Constant::Decimal(v) => write!(f, "{}", v),
            Constant::Boolean(v) => write!(f, "{}", v),
            Constant::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Constant::Date(v) => write!(f, "{}", v),
            Constant::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Constant::EnumMembers(members) => {
                let ordinals: Vec<String> = members.iter().map(|m| m.ordinal.to_string()).collect();
                write!(f, "({})", ordinals.join(", "))
            }
        }
    }
}

// =============================================================================
// Predicates
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// A boolean predicate over backend paths.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        path: BackendPath,
        op: CompareOp,
        value: Constant,
    },
    IsNull {
        path: BackendPath,
        negated: bool,
    },
    /// Membership of an enum path in a set of members.
    In {
        path: BackendPath,
        members: Vec<EnumMember>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { path, op, value } => write!(f, "{} {} {}", path, op.as_str(), value),
            Expr::IsNull { path, negated } => {
                if *negated {
                    write!(f, "{} is not null", path)
                } else {
                    write!(f, "{} is null", path)
                }
            }
            Expr::In { path, members } => {
                let ordinals: Vec<String> = members.iter().map(|m| m.ordinal.to_string()).collect();
                write!(f, "{} in ({})", path, ordinals.join(", "))
            }
            Expr::And(l, r) => write!(f, "({} and {})", l, r),
            Expr::Or(l, r) => write!(f, "({} or {})", l, r),
            Expr::Not(inner) => write!(f, "not {}", inner),
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// One order specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub path: BackendPath,
    pub dir: SortDir,
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.dir {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        };
        write!(f, "{} {}", self.path, dir)
    }
}
