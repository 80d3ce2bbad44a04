#[path = "../common/mod.rs"]
mod common;

use cicada::catalog::Catalog;
use cicada::model::types::{int64, string};
use cicada::model::{FieldDescriptor, PrimitiveKind, TypeDescriptor, ValueType};
use cicada::query::expr::{
    complex, enum_lit, lit, lit_int, lit_null, lit_str, member, nav, primitive, prop,
};
use cicada::query::{
    BinaryOperatorKind, FilterExpr, OrderByItem, PathKind, QueryTranslator, TranslateError,
    Translated,
};

use common::{catalog, person_chain, school, supertype_scenario};

fn school_catalog() -> Catalog {
    catalog(school())
}

fn filter(catalog: &Catalog, root: &str, expr: FilterExpr) -> Result<String, TranslateError> {
    QueryTranslator::new(catalog, root)?
        .translate_filter(&expr)
        .map(|p| p.to_string())
}

// =============================================================================
// Member paths
// =============================================================================

#[test]
fn test_navigation_chain() {
    let catalog = catalog(person_chain());
    let translator = QueryTranslator::new(&catalog, "Person").unwrap();

    let path = translator
        .translate_member(&[nav("Parent"), nav("Child"), primitive("Name")])
        .unwrap();

    insta::assert_snapshot!(path.to_string(), @"person.parent.child.name");
    assert_eq!(path.kind(), PathKind::String);
    assert_eq!(path.entity(), "Child");
}

#[test]
fn test_navigation_ends_as_entity_path() {
    let catalog = catalog(person_chain());
    let translator = QueryTranslator::new(&catalog, "Person").unwrap();

    let path = translator.translate_member(&[nav("Parent")]).unwrap();
    assert_eq!(path.to_string(), "person.parent");
    assert_eq!(path.kind(), PathKind::Entity);
    assert_eq!(path.entity(), "Parent");
}

#[test]
fn test_complex_member() {
    let catalog = school_catalog();
    let translator = QueryTranslator::new(&catalog, "Student").unwrap();

    let path = translator
        .translate_member(&[complex("Address"), primitive("City")])
        .unwrap();
    assert_eq!(path.to_string(), "student.address.city");
    assert_eq!(path.kind(), PathKind::String);
}

#[test]
fn test_inherited_complex_member_goes_through_super_entity() {
    let catalog = catalog(supertype_scenario());
    let translator = QueryTranslator::new(&catalog, "Manager").unwrap();

    let path = translator
        .translate_member(&[complex("Address"), primitive("City")])
        .unwrap();
    insta::assert_snapshot!(path.to_string(), @"manager.employee.address.city");
    assert!(path.is_hop(0));
    assert!(!path.is_hop(1));
}

#[test]
fn test_inherited_member_without_super_entity_fails() {
    let employee = TypeDescriptor::entity("Employee", &["Id"])
        .entity_set("Employees")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("address", ValueType::complex("Address")).named("Address"));
    let intern = TypeDescriptor::entity("Intern", &["Id"])
        .entity_set("Interns")
        .inherit(&employee);
    let catalog = catalog(vec![common::address(), employee, intern]);
    let translator = QueryTranslator::new(&catalog, "Intern").unwrap();

    let err = translator
        .translate_member(&[complex("Address"), primitive("City")])
        .unwrap_err();
    assert!(matches!(err, TranslateError::MissingSuperEntity { ref owner, .. } if owner == "Intern"));
}

#[test]
fn test_persistence_overrides() {
    let course = TypeDescriptor::entity("Course", &["Id"])
        .entity_set("Courses")
        .field(
            FieldDescriptor::property("id", int64())
                .named("Id")
                .persisted_as("course_id"),
        )
        .field(
            FieldDescriptor::property("title", string())
                .named("Title")
                .persisted_as("details.title"),
        );
    let catalog = catalog(vec![course]);
    let translator = QueryTranslator::new(&catalog, "Course").unwrap();

    let path = translator.translate_member(&[primitive("Title")]).unwrap();
    assert_eq!(path.to_string(), "course.details.title");
    assert_eq!(path.segments().len(), 2);

    let path = translator.translate_member(&[primitive("Id")]).unwrap();
    assert_eq!(path.relative(), "course_id");
    assert_eq!(path.kind(), PathKind::Long);
}

#[test]
fn test_unknown_property() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Shoe").eq(lit_int(1))).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Unknown property Shoe on Student");
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_unknown_root() {
    let catalog = school_catalog();
    let err = QueryTranslator::new(&catalog, "Teacher").unwrap_err();
    assert!(matches!(err, TranslateError::UnknownEntityType(ref name) if name == "Teacher"));
}

// =============================================================================
// Comparisons
// =============================================================================

#[test]
fn test_integer_comparison() {
    let catalog = school_catalog();
    let predicate = filter(&catalog, "Student", prop("Age").gt(lit_int(18))).unwrap();
    insta::assert_snapshot!(predicate, @"student.age > 18");
}

#[test]
fn test_null_comparisons_become_null_checks() {
    let catalog = school_catalog();

    let predicate = filter(&catalog, "Student", prop("Name").eq(lit_null())).unwrap();
    insta::assert_snapshot!(predicate, @"student.name is null");

    let predicate = filter(&catalog, "Student", prop("Name").ne(lit_null())).unwrap();
    insta::assert_snapshot!(predicate, @"student.name is not null");
}

#[test]
fn test_ordering_against_null_is_unsupported() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Age").gt(lit_null())).unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedPredicate(_)));
    assert_eq!(err.status_code(), 501);
}

#[test]
fn test_logical_combination() {
    let catalog = school_catalog();
    let expr = prop("Age")
        .ge(lit_int(18))
        .and(prop("Name").eq(lit_str("O'Neil")).or(prop("Name").eq(lit_str("Joe"))))
        .not();
    let predicate = filter(&catalog, "Student", expr).unwrap();
    insta::assert_snapshot!(
        predicate,
        @"not (student.age >= 18 and (student.name = 'O''Neil' or student.name = 'Joe'))"
    );
}

#[test]
fn test_string_against_integer_path_is_mismatch() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Age").eq(lit_str("old"))).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::TypeMismatch { ref path, ref constant } if path == "student.age" && constant == "string"
    ));
}

#[test]
fn test_long_constant_against_int_path() {
    let catalog = school_catalog();
    let predicate = filter(
        &catalog,
        "Student",
        prop("Age").lt(lit("30", PrimitiveKind::Int64)),
    )
    .unwrap();
    assert_eq!(predicate, "student.age < 30");
}

#[test]
fn test_boolean_ordering_is_unsupported() {
    let flagged = TypeDescriptor::entity("Flag", &["Id"])
        .entity_set("Flags")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("on", cicada::model::types::boolean()).named("On"));
    let catalog = catalog(vec![flagged]);

    let predicate = filter(&catalog, "Flag", prop("On").eq(lit("true", PrimitiveKind::Boolean)));
    assert_eq!(predicate.unwrap(), "flag.on = true");

    let err = filter(&catalog, "Flag", prop("On").gt(lit("true", PrimitiveKind::Boolean)));
    assert!(matches!(err, Err(TranslateError::UnsupportedPredicate(_))));
}

#[test]
fn test_unsupported_constant_kinds_are_signalled() {
    let catalog = school_catalog();
    let translator = QueryTranslator::new(&catalog, "Student").unwrap();

    for literal in [
        lit("1.5", PrimitiveKind::Double),
        lit("2.50", PrimitiveKind::Decimal),
        lit("2020-01-01", PrimitiveKind::Date),
        lit("2020-01-01T10:00:00Z", PrimitiveKind::DateTimeOffset),
    ] {
        let translated = translator.translate(&prop("Age").eq(literal)).unwrap();
        assert!(matches!(translated, Translated::Unsupported(_)));
    }
}

#[test]
fn test_invalid_literal() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Age").eq(lit("ten", PrimitiveKind::Int32))).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Invalid Edm.Int32 literal: ten");
}

#[test]
fn test_arithmetic_and_methods_are_unsupported() {
    let catalog = school_catalog();

    let sum = FilterExpr::Binary {
        op: BinaryOperatorKind::Add,
        left: Box::new(prop("Age")),
        right: Box::new(lit_int(1)),
    };
    let err = filter(&catalog, "Student", sum.gt(lit_int(18))).unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedPredicate(_)));

    let method = FilterExpr::Method {
        name: "contains".into(),
        args: vec![prop("Name"), lit_str("jo")],
    };
    let err = filter(&catalog, "Student", method).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Unsupported predicate: method call contains");
}

#[test]
fn test_unsupported_operand_poisons_conjunction() {
    let catalog = school_catalog();
    let expr = prop("Age")
        .gt(lit_int(18))
        .and(prop("Age").eq(lit("1.5", PrimitiveKind::Double)));
    let err = filter(&catalog, "Student", expr).unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedPredicate(_)));
}

#[test]
fn test_bare_path_is_not_a_predicate() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Name")).unwrap_err();
    assert!(matches!(err, TranslateError::NotAPredicate(_)));
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_equality_is_membership() {
    let catalog = school_catalog();

    let predicate = filter(
        &catalog,
        "Student",
        prop("Grade").eq(enum_lit("com.example.school.Grade", &["B"])),
    )
    .unwrap();
    insta::assert_snapshot!(predicate, @"student.grade in (1)");

    let predicate = filter(&catalog, "Student", prop("Grade").ne(enum_lit("Grade", &["A"]))).unwrap();
    insta::assert_snapshot!(predicate, @"not student.grade in (0)");
}

#[test]
fn test_enum_has_with_member_list() {
    let catalog = school_catalog();
    let predicate = filter(
        &catalog,
        "Student",
        prop("Grade").has(enum_lit("Grade", &["A,C"])),
    )
    .unwrap();
    assert_eq!(predicate, "student.grade in (0, 2)");
}

#[test]
fn test_unknown_enum_member() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Grade").eq(enum_lit("Grade", &["Z"]))).unwrap_err();
    assert!(matches!(err, TranslateError::UnknownEnumMember { ref member, .. } if member == "Z"));
}

#[test]
fn test_enum_against_non_enum_path() {
    let catalog = school_catalog();
    let err = filter(&catalog, "Student", prop("Name").eq(enum_lit("Grade", &["A"]))).unwrap_err();
    assert!(matches!(err, TranslateError::TypeMismatch { .. }));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_order_items() {
    let catalog = school_catalog();
    let translator = QueryTranslator::new(&catalog, "Student").unwrap();

    let order = translator
        .translate_order(&OrderByItem::desc(prop("Name")))
        .unwrap()
        .unwrap();
    insta::assert_snapshot!(order.to_string(), @"student.name desc");

    let nested = translator
        .translate_order(&OrderByItem::asc(member(vec![complex("Address"), primitive("City")])))
        .unwrap()
        .unwrap();
    assert_eq!(nested.to_string(), "student.address.city asc");

    // A constant has nothing to order by.
    assert!(translator
        .translate_order(&OrderByItem::asc(lit_int(1)))
        .unwrap()
        .is_none());
}

#[test]
fn test_enum_order_carries_ordinals() {
    let catalog = school_catalog();
    let translator = QueryTranslator::new(&catalog, "Student").unwrap();

    let order = translator
        .translate_order(&OrderByItem::asc(prop("Grade")))
        .unwrap()
        .unwrap();
    assert_eq!(order.path.kind(), PathKind::Enum);
    assert_eq!(order.path.ordinal("A"), Some(0));
    assert_eq!(order.path.ordinal("C"), Some(2));
    assert_eq!(order.path.ordinal("Z"), None);
}
