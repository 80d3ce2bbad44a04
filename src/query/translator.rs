//! Filter and order-by translation.
//!
//! The translator walks a [`FilterExpr`] bottom-up. Member paths are resolved
//! hop by hop against the catalog, switching the cursor type at every
//! navigation or complex segment:
//!
//! ```text
//! Parent/Child/Name
//!   cursor Person  ─ Parent (navigation) ─▶ person.parent        cursor Parent
//!   cursor Parent  ─ Child  (navigation) ─▶ person.parent.child  cursor Child
//!   cursor Child   ─ Name   (primitive)  ─▶ person.parent.child.name : String
//! ```
//!
//! Operands and operators without a backend equivalent produce
//! [`Translated::Unsupported`] instead of silently vanishing.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::{TranslateError, TranslateResult};
use super::expr::{
    BinaryOperatorKind, FilterExpr, Literal, OrderByItem, PathSegment, UnaryOperatorKind,
};
use super::predicate::{BackendPath, CompareOp, Constant, Expr, OrderSpec, PathKind, SortDir};
use crate::catalog::Catalog;
use crate::model::{
    EnumMember, FieldDescriptor, FullQualifiedName, PrimitiveKind, TypeDescriptor, ValueType,
};

/// Result of translating one sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Translated {
    Path(BackendPath),
    Constant(Constant),
    Predicate(Expr),
    /// The untyped `null` literal.
    Null,
    /// No backend equivalent; carries the reason.
    Unsupported(String),
}

impl Translated {
    fn describe(&self) -> String {
        match self {
            Translated::Path(path) => format!("path {}", path),
            Translated::Constant(c) => format!("{} constant {}", c.type_label(), c),
            Translated::Predicate(p) => format!("predicate {}", p),
            Translated::Null => "null".to_string(),
            Translated::Unsupported(reason) => format!("unsupported ({})", reason),
        }
    }
}

/// Translates expressions rooted at one entity type.
///
/// Cheap to build; create one per request.
#[derive(Debug, Clone)]
pub struct QueryTranslator<'a> {
    catalog: &'a Catalog,
    root: &'a TypeDescriptor,
    root_path: BackendPath,
}

impl<'a> QueryTranslator<'a> {
    /// Translator rooted at the entity type registered as `entity_type`.
    pub fn new(catalog: &'a Catalog, entity_type: &str) -> TranslateResult<Self> {
        let root = catalog
            .entity_type(entity_type)
            .ok_or_else(|| TranslateError::UnknownEntityType(entity_type.to_string()))?;
        Ok(Self::for_descriptor(catalog, root))
    }

    pub fn for_descriptor(catalog: &'a Catalog, root: &'a TypeDescriptor) -> Self {
        let root_path = BackendPath::root(&root.path_variable(), root.persistence_entity());
        Self {
            catalog,
            root,
            root_path,
        }
    }

    pub fn root_path(&self) -> &BackendPath {
        &self.root_path
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    pub fn translate(&self, expr: &FilterExpr) -> TranslateResult<Translated> {
        match expr {
            FilterExpr::Member(segments) => self.translate_member(segments).map(Translated::Path),
            FilterExpr::Literal(literal) => self.translate_literal(literal),
            FilterExpr::Enum { type_name, members } => self.translate_enum(type_name, members),
            FilterExpr::Binary { op, left, right } => {
                let left = self.translate(left)?;
                let right = self.translate(right)?;
                self.translate_binary(*op, left, right)
            }
            FilterExpr::Unary { op, operand } => {
                let operand = self.translate(operand)?;
                self.translate_unary(*op, operand)
            }
            FilterExpr::Method { name, .. } => {
                Ok(Translated::Unsupported(format!("method call {}", name)))
            }
            FilterExpr::Lambda { variable, .. } => Ok(Translated::Unsupported(format!(
                "lambda over {}",
                variable
            ))),
        }
    }

    /// Translate a `$filter` into a predicate.
    ///
    /// An unsupported filter fails with [`TranslateError::UnsupportedPredicate`]
    /// rather than matching everything.
    pub fn translate_filter(&self, expr: &FilterExpr) -> TranslateResult<Expr> {
        match self.translate(expr)? {
            Translated::Predicate(predicate) => {
                debug!("Filter translated to {}", predicate);
                Ok(predicate)
            }
            Translated::Unsupported(reason) => {
                warn!("Filter on {} is not supported: {}", self.root.type_name, reason);
                Err(TranslateError::UnsupportedPredicate(reason))
            }
            other => Err(TranslateError::NotAPredicate(other.describe())),
        }
    }

    /// Translate an `$orderby` item. Items that are not paths are skipped.
    pub fn translate_order(&self, item: &OrderByItem) -> TranslateResult<Option<OrderSpec>> {
        match self.translate(&item.expr)? {
            Translated::Path(path) => Ok(Some(OrderSpec {
                path,
                dir: if item.descending {
                    SortDir::Desc
                } else {
                    SortDir::Asc
                },
            })),
            other => {
                debug!("Order item skipped: {}", other.describe());
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Resolve a member path to a backend path.
    pub fn translate_member(&self, segments: &[PathSegment]) -> TranslateResult<BackendPath> {
        let mut cursor: &'a TypeDescriptor = self.root;
        let mut path = self.root_path.clone();

        for segment in segments {
            match segment {
                PathSegment::Primitive(name) => {
                    let field = self.field(cursor, name)?;
                    let kind = self.path_kind(cursor, field)?;
                    let mut path =
                        qualified(path, cursor, field.persistence_name()).with_kind(kind);
                    if kind == PathKind::Enum {
                        if let Some(tag) = field
                            .value_type
                            .target_name()
                            .and_then(|name| self.catalog.enum_tag(name))
                        {
                            path = path.with_members(tag.members.clone());
                        }
                    }
                    debug!("Member {} resolved to {}", name, path);
                    return Ok(path);
                }
                PathSegment::Navigation(name) => {
                    let field = self.field(cursor, name)?;
                    let target_name =
                        field
                            .navigation_target()
                            .ok_or_else(|| TranslateError::UnknownType {
                                type_name: field.value_type.to_string(),
                                referenced_by: format!("{}.{}", cursor.type_name, name),
                            })?;
                    let target = self.lookup(target_name, cursor, name)?;
                    let entity = field
                        .persistence_entity()
                        .unwrap_or(target.persistence_entity());

                    path = qualified(path, cursor, field.persistence_name())
                        .with_kind(PathKind::Entity)
                        .with_entity(entity);
                    cursor = target;
                }
                PathSegment::Complex(name) => {
                    let field = self.field(cursor, name)?;

                    // Inherited field: hop through the super-entity link first.
                    if let Some(declaring) = field
                        .declared_on
                        .as_deref()
                        .filter(|d| *d != cursor.type_name)
                    {
                        let super_entity = cursor.super_entity().ok_or_else(|| {
                            TranslateError::MissingSuperEntity {
                                owner: cursor.type_name.clone(),
                                field: name.clone(),
                            }
                        })?;
                        let declaring = self.lookup(declaring, cursor, name)?;
                        path = path
                            .hop(super_entity)
                            .with_entity(declaring.persistence_entity());
                        cursor = declaring;
                    }

                    let complex_name = field.value_type.target_name().ok_or_else(|| {
                        TranslateError::UnknownType {
                            type_name: field.value_type.to_string(),
                            referenced_by: format!("{}.{}", cursor.type_name, name),
                        }
                    })?;
                    let complex = self.lookup(complex_name, cursor, name)?;

                    path = match field.persistence_entity() {
                        Some(entity) => path.child(field.persistence_name()).with_entity(entity),
                        None => {
                            let owner_entity = cursor.persistence_entity();
                            qualified(path, cursor, field.persistence_name())
                                .with_entity(owner_entity)
                        }
                    }
                    .with_kind(PathKind::Complex);
                    cursor = complex;
                }
            }
        }

        Ok(path)
    }

    fn field(
        &self,
        owner: &'a TypeDescriptor,
        name: &str,
    ) -> TranslateResult<&'a FieldDescriptor> {
        owner
            .find_field(name)
            .ok_or_else(|| TranslateError::UnknownProperty {
                owner: owner.type_name.clone(),
                property: name.to_string(),
            })
    }

    fn lookup(
        &self,
        type_name: &str,
        owner: &TypeDescriptor,
        field: &str,
    ) -> TranslateResult<&'a TypeDescriptor> {
        self.catalog
            .descriptor(type_name)
            .ok_or_else(|| TranslateError::UnknownType {
                type_name: type_name.to_string(),
                referenced_by: format!("{}.{}", owner.type_name, field),
            })
    }

    fn path_kind(&self, owner: &TypeDescriptor, field: &FieldDescriptor) -> TranslateResult<PathKind> {
        let overridden = field
            .as_property()
            .and_then(|tag| tag.type_override.as_deref())
            .and_then(PrimitiveKind::from_edm_name);
        if let Some(kind) = overridden {
            return Ok(primitive_path_kind(kind));
        }

        match field.value_type.element() {
            ValueType::Primitive(kind) => Ok(primitive_path_kind(*kind)),
            ValueType::Enum(_) => Ok(PathKind::Enum),
            ValueType::Complex(_) => Ok(PathKind::Complex),
            ValueType::Entity(_) => Ok(PathKind::Entity),
            ValueType::Opaque(_) | ValueType::Collection(_) => Err(TranslateError::UnknownType {
                type_name: field.value_type.to_string(),
                referenced_by: format!("{}.{}", owner.type_name, field.name),
            }),
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub fn translate_binary(
        &self,
        op: BinaryOperatorKind,
        left: Translated,
        right: Translated,
    ) -> TranslateResult<Translated> {
        let compare_op = match op {
            BinaryOperatorKind::And | BinaryOperatorKind::Or => {
                return match (left, right) {
                    (Translated::Predicate(l), Translated::Predicate(r)) => {
                        Ok(Translated::Predicate(if op == BinaryOperatorKind::And {
                            l.and(r)
                        } else {
                            l.or(r)
                        }))
                    }
                    (Translated::Unsupported(reason), _) | (_, Translated::Unsupported(reason)) => {
                        Ok(Translated::Unsupported(reason))
                    }
                    (Translated::Predicate(_), other) | (other, _) => {
                        Err(TranslateError::NotAPredicate(other.describe()))
                    }
                };
            }
            BinaryOperatorKind::Has => return Ok(self.translate_has(left, right)),
            BinaryOperatorKind::Eq => CompareOp::Eq,
            BinaryOperatorKind::Ne => CompareOp::Ne,
            BinaryOperatorKind::Gt => CompareOp::Gt,
            BinaryOperatorKind::Ge => CompareOp::Ge,
            BinaryOperatorKind::Lt => CompareOp::Lt,
            BinaryOperatorKind::Le => CompareOp::Le,
            BinaryOperatorKind::Add
            | BinaryOperatorKind::Sub
            | BinaryOperatorKind::Mul
            | BinaryOperatorKind::Div
            | BinaryOperatorKind::Mod => {
                return Ok(Translated::Unsupported(format!("arithmetic operator {:?}", op)))
            }
        };

        let path = match left {
            Translated::Path(path) => path,
            Translated::Unsupported(reason) => return Ok(Translated::Unsupported(reason)),
            other => {
                return Ok(Translated::Unsupported(format!(
                    "left operand {} is not a property",
                    other.describe()
                )))
            }
        };

        match right {
            Translated::Null => Ok(match compare_op {
                CompareOp::Eq => Translated::Predicate(Expr::IsNull {
                    path,
                    negated: false,
                }),
                CompareOp::Ne => Translated::Predicate(Expr::IsNull {
                    path,
                    negated: true,
                }),
                _ => Translated::Unsupported(format!("ordering comparison of {} with null", path)),
            }),
            Translated::Constant(value) => self.compare(path, compare_op, value),
            Translated::Unsupported(reason) => Ok(Translated::Unsupported(reason)),
            other => Ok(Translated::Unsupported(format!(
                "right operand {} is not a constant",
                other.describe()
            ))),
        }
    }

    /// Typed comparison, dispatched on the constant's runtime type.
    fn compare(
        &self,
        path: BackendPath,
        op: CompareOp,
        value: Constant,
    ) -> TranslateResult<Translated> {
        let compatible = match &value {
            Constant::Int(_) | Constant::Long(_) => {
                matches!(path.kind(), PathKind::Int | PathKind::Long)
            }
            Constant::String(_) => path.kind() == PathKind::String,
            Constant::Boolean(_) => {
                if !matches!(op, CompareOp::Eq | CompareOp::Ne) {
                    return Ok(Translated::Unsupported(format!(
                        "ordering comparison of boolean {}",
                        path
                    )));
                }
                path.kind() == PathKind::Boolean
            }
            Constant::EnumMembers(members) => {
                if path.kind() != PathKind::Enum {
                    false
                } else {
                    let membership = Expr::In {
                        path,
                        members: members.clone(),
                    };
                    return Ok(match op {
                        CompareOp::Eq => Translated::Predicate(membership),
                        CompareOp::Ne => Translated::Predicate(membership.negate()),
                        _ => Translated::Unsupported("ordering comparison of enum".to_string()),
                    });
                }
            }
            Constant::Double(_)
            | Constant::Decimal(_)
            | Constant::Date(_)
            | Constant::DateTime(_) => {
                return Ok(Translated::Unsupported(format!(
                    "comparison with a {} constant",
                    value.type_label()
                )));
            }
        };

        if !compatible {
            return Err(TranslateError::TypeMismatch {
                path: path.to_string(),
                constant: value.type_label().to_string(),
            });
        }
        Ok(Translated::Predicate(Expr::Compare { path, op, value }))
    }

    fn translate_has(&self, left: Translated, right: Translated) -> Translated {
        match (left, right) {
            (Translated::Path(path), Translated::Constant(Constant::EnumMembers(members)))
                if path.kind() == PathKind::Enum =>
            {
                Translated::Predicate(Expr::In { path, members })
            }
            (Translated::Unsupported(reason), _) | (_, Translated::Unsupported(reason)) => {
                Translated::Unsupported(reason)
            }
            (left, right) => Translated::Unsupported(format!(
                "has between {} and {}",
                left.describe(),
                right.describe()
            )),
        }
    }

    pub fn translate_unary(
        &self,
        op: UnaryOperatorKind,
        operand: Translated,
    ) -> TranslateResult<Translated> {
        match (op, operand) {
            (UnaryOperatorKind::Not, Translated::Predicate(p)) => {
                Ok(Translated::Predicate(p.negate()))
            }
            (_, Translated::Unsupported(reason)) => Ok(Translated::Unsupported(reason)),
            (UnaryOperatorKind::Not, other) => Err(TranslateError::NotAPredicate(other.describe())),
            (UnaryOperatorKind::Minus, _) => {
                Ok(Translated::Unsupported("unary minus".to_string()))
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    /// Map a literal to a typed constant by its protocol kind.
    pub fn translate_literal(&self, literal: &Literal) -> TranslateResult<Translated> {
        let Some(kind) = literal.kind else {
            return Ok(Translated::Null);
        };
        let text = literal.text.trim();
        let invalid = || TranslateError::InvalidLiteral {
            kind: kind.edm_name().to_string(),
            text: literal.text.clone(),
        };

        let constant = match kind {
            PrimitiveKind::SByte | PrimitiveKind::Int16 | PrimitiveKind::Int32 => {
                Constant::Int(text.parse().map_err(|_| invalid())?)
            }
            PrimitiveKind::Int64 => Constant::Long(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Double => Constant::Double(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Decimal => {
                Constant::Decimal(Decimal::from_str(text).map_err(|_| invalid())?)
            }
            PrimitiveKind::Boolean => Constant::Boolean(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Date => Constant::Date(
                NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())?,
            ),
            PrimitiveKind::DateTimeOffset => {
                Constant::DateTime(DateTime::parse_from_rfc3339(text).map_err(|_| invalid())?)
            }
            PrimitiveKind::String => Constant::String(trim_quotes(text)),
        };
        Ok(Translated::Constant(constant))
    }

    /// Resolve enum literal members to their declared ordinals.
    fn translate_enum(&self, type_name: &str, members: &[String]) -> TranslateResult<Translated> {
        let name = FullQualifiedName::parse(type_name)
            .map(|fqn| fqn.name)
            .unwrap_or_else(|| type_name.to_string());
        let tag = self
            .catalog
            .enum_type(&name)
            .and_then(|desc| desc.enum_type.as_ref())
            .ok_or_else(|| TranslateError::UnknownType {
                type_name: type_name.to_string(),
                referenced_by: "enum literal".to_string(),
            })?;

        let mut resolved: Vec<EnumMember> = Vec::new();
        for member in members.iter().flat_map(|m| m.split(',')) {
            let member = member.trim();
            let declared = tag
                .member(member)
                .ok_or_else(|| TranslateError::UnknownEnumMember {
                    enum_type: name.clone(),
                    member: member.to_string(),
                })?;
            resolved.push(declared.clone());
        }
        Ok(Translated::Constant(Constant::EnumMembers(resolved)))
    }
}

/// Extend `path` by `field`, behind the owner's super entity if it has one.
fn qualified(path: BackendPath, owner: &TypeDescriptor, field: &str) -> BackendPath {
    match owner.super_entity() {
        Some(super_entity) => path.hop(super_entity).child(field),
        None => path.child(field),
    }
}

fn primitive_path_kind(kind: PrimitiveKind) -> PathKind {
    match kind {
        PrimitiveKind::SByte | PrimitiveKind::Int16 | PrimitiveKind::Int32 => PathKind::Int,
        PrimitiveKind::Int64 => PathKind::Long,
        PrimitiveKind::Double => PathKind::Double,
        PrimitiveKind::Decimal => PathKind::Decimal,
        PrimitiveKind::String => PathKind::String,
        PrimitiveKind::Boolean => PathKind::Boolean,
        PrimitiveKind::Date => PathKind::Date,
        PrimitiveKind::DateTimeOffset => PathKind::DateTime,
    }
}

/// Strip surrounding single quotes and unescape doubled ones.
fn trim_quotes(text: &str) -> String {
    text.trim_matches('\'').replace("''", "'")
}
