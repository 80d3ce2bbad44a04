//! Parsed filter and order-by expressions.
//!
//! This is the already-typed tree the protocol dispatcher hands over; the
//! translator turns it into a backend [`Expr`](super::predicate::Expr).

use crate::model::PrimitiveKind;

/// One hop of a member path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Primitive or enum property; always the last segment.
    Primitive(String),
    Navigation(String),
    Complex(String),
}

/// A literal as written in the request, with its protocol kind.
///
/// `kind` is `None` for the untyped `null` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub kind: Option<PrimitiveKind>,
}

/// Binary operators of the filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorKind {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
    Has,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperatorKind {
    Not,
    Minus,
}

/// A filter expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Member(Vec<PathSegment>),
    Literal(Literal),
    /// Enum literal(s): `ns.Grade'A,B'`.
    Enum {
        type_name: String,
        members: Vec<String>,
    },
    Binary {
        op: BinaryOperatorKind,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    Unary {
        op: UnaryOperatorKind,
        operand: Box<FilterExpr>,
    },
    Method {
        name: String,
        args: Vec<FilterExpr>,
    },
    Lambda {
        variable: String,
        body: Box<FilterExpr>,
    },
}

impl FilterExpr {
    fn binary(self, op: BinaryOperatorKind, right: FilterExpr) -> FilterExpr {
        FilterExpr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    pub fn eq(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Eq, right)
    }

    pub fn ne(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Ne, right)
    }

    pub fn gt(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Gt, right)
    }

    pub fn ge(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Ge, right)
    }

    pub fn lt(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Lt, right)
    }

    pub fn le(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Le, right)
    }

    pub fn and(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::And, right)
    }

    pub fn or(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Or, right)
    }

    pub fn has(self, right: FilterExpr) -> FilterExpr {
        self.binary(BinaryOperatorKind::Has, right)
    }

    pub fn not(self) -> FilterExpr {
        FilterExpr::Unary {
            op: UnaryOperatorKind::Not,
            operand: Box::new(self),
        }
    }
}

/// One `$orderby` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByItem {
    pub expr: FilterExpr,
    pub descending: bool,
}

impl OrderByItem {
    pub fn asc(expr: FilterExpr) -> Self {
        Self {
            expr,
            descending: false,
        }
    }

    pub fn desc(expr: FilterExpr) -> Self {
        Self {
            expr,
            descending: true,
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Single-property member path.
pub fn prop(name: &str) -> FilterExpr {
    FilterExpr::Member(vec![PathSegment::Primitive(name.into())])
}

/// Multi-hop member path.
pub fn member(segments: Vec<PathSegment>) -> FilterExpr {
    FilterExpr::Member(segments)
}

pub fn nav(name: &str) -> PathSegment {
    PathSegment::Navigation(name.into())
}

pub fn complex(name: &str) -> PathSegment {
    PathSegment::Complex(name.into())
}

pub fn primitive(name: &str) -> PathSegment {
    PathSegment::Primitive(name.into())
}

pub fn lit(text: &str, kind: PrimitiveKind) -> FilterExpr {
    FilterExpr::Literal(Literal {
        text: text.into(),
        kind: Some(kind),
    })
}

pub fn lit_int(value: i32) -> FilterExpr {
    lit(&value.to_string(), PrimitiveKind::Int32)
}

pub fn lit_long(value: i64) -> FilterExpr {
    lit(&value.to_string(), PrimitiveKind::Int64)
}

/// String literal, quoted the way the request carries it.
pub fn lit_str(value: &str) -> FilterExpr {
    lit(&format!("'{}'", value), PrimitiveKind::String)
}

pub fn lit_bool(value: bool) -> FilterExpr {
    lit(&value.to_string(), PrimitiveKind::Boolean)
}

pub fn lit_null() -> FilterExpr {
    FilterExpr::Literal(Literal {
        text: "null".into(),
        kind: None,
    })
}

pub fn enum_lit(type_name: &str, members: &[&str]) -> FilterExpr {
    FilterExpr::Enum {
        type_name: type_name.into(),
        members: members.iter().map(|m| m.to_string()).collect(),
    }
}
