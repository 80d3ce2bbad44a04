#[path = "../common/mod.rs"]
mod common;

use cicada::backend::{MemoryExecutor, RepositoryOperation};
use cicada::catalog::Catalog;
use cicada::marshal::{PrimitiveValue, Record, Value, WireCollection, WireInline, WireValue};
use cicada::pipeline::{
    CollectionRequest, KeyPredicate, OperationRegistry, PagingPolicy, ReadPipeline, RequestError,
};
use cicada::query::expr::{lit_int, lit_null, lit_str, member, nav, primitive, prop};
use cicada::query::{ExpandOption, OrderByItem, QueryOptions};

use common::{catalog, course_record, registry, school, student_record, students};

fn school_catalog() -> Catalog {
    catalog(school())
}

fn ids(collection: &WireCollection) -> Vec<&str> {
    collection
        .entities
        .iter()
        .filter_map(|e| e.id.as_deref())
        .collect()
}

fn names(collection: &WireCollection) -> Vec<String> {
    collection
        .entities
        .iter()
        .filter_map(|e| match &e.property("Name")?.value {
            WireValue::Primitive(PrimitiveValue::String(name)) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn students_request(options: QueryOptions, query: Option<&str>) -> CollectionRequest {
    CollectionRequest::new("Students", options).with_request("/odata/Students", query)
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn test_filter_order_and_top() {
    let catalog = school_catalog();
    let operations = registry(
        vec![
            student_record(1, "Ann", 20, "A"),
            student_record(2, "Bob", 17, "B"),
            student_record(3, "Cid", 30, "C"),
            student_record(4, "Dee", 19, "A"),
        ],
        Vec::new(),
    );
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let options = QueryOptions::new()
        .with_filter(prop("Age").gt(lit_int(18)))
        .with_order_by(OrderByItem::desc(prop("Name")))
        .with_top(2);
    let page = pipeline
        .read_collection(&students_request(options, Some("$top=2")))
        .unwrap();

    assert_eq!(names(&page), vec!["Dee", "Cid"]);
    assert!(page.next_link.is_none());
    assert!(page.count.is_none());
}

#[test]
fn test_server_driven_paging() {
    let catalog = school_catalog();
    let operations = registry(students(250), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations).with_paging(PagingPolicy::new(100));

    let first = pipeline
        .read_collection(&students_request(QueryOptions::new(), None))
        .unwrap();
    assert_eq!(first.entities.len(), 100);
    assert_eq!(first.entities[0].id.as_deref(), Some("Students(Id=1)"));
    insta::assert_snapshot!(first.next_link.unwrap(), @"/odata/Students?$skip=100");

    let second = pipeline
        .read_collection(&students_request(
            QueryOptions::new().with_skip(100),
            Some("$skip=100"),
        ))
        .unwrap();
    assert_eq!(second.entities.len(), 100);
    assert_eq!(second.entities[0].id.as_deref(), Some("Students(Id=101)"));
    insta::assert_snapshot!(second.next_link.unwrap(), @"/odata/Students?$skip=200");

    let last = pipeline
        .read_collection(&students_request(
            QueryOptions::new().with_skip(200),
            Some("$skip=200"),
        ))
        .unwrap();
    assert_eq!(last.entities.len(), 50);
    assert!(last.next_link.is_none());
}

#[test]
fn test_top_above_ceiling_keeps_other_parameters() {
    let catalog = school_catalog();
    let operations = registry(students(250), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations).with_paging(PagingPolicy::new(100));

    let options = QueryOptions::new()
        .with_order_by(OrderByItem::asc(prop("Id")))
        .with_top(150);
    let page = pipeline
        .read_collection(&students_request(options, Some("$top=150&$orderby=Id")))
        .unwrap();

    assert_eq!(page.entities.len(), 100);
    insta::assert_snapshot!(page.next_link.unwrap(), @"/odata/Students?$top=150&$orderby=Id&$skip=100");
}

#[test]
fn test_following_links_ignores_original_top() {
    let catalog = school_catalog();
    let operations = registry(students(250), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations).with_paging(PagingPolicy::new(100));
    let page_at = |skip: usize| {
        let options = QueryOptions::new()
            .with_order_by(OrderByItem::asc(prop("Id")))
            .with_top(150)
            .with_skip(skip);
        let query = format!("$top=150&$orderby=Id&$skip={}", skip);
        pipeline
            .read_collection(&students_request(options, Some(&query)))
            .unwrap()
    };

    // $top travels unchanged, so each link asks for up to 150 more rows.
    let second = page_at(100);
    assert_eq!(second.entities.len(), 100);
    assert_eq!(second.entities[0].id.as_deref(), Some("Students(Id=101)"));
    insta::assert_snapshot!(second.next_link.unwrap(), @"/odata/Students?$top=150&$orderby=Id&$skip=200");

    let last = page_at(200);
    assert_eq!(last.entities.len(), 50);
    assert!(last.next_link.is_none());
}

#[test]
fn test_no_link_when_everything_fits() {
    let catalog = school_catalog();
    let operations = registry(students(100), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations).with_paging(PagingPolicy::new(100));

    let page = pipeline
        .read_collection(&students_request(QueryOptions::new(), None))
        .unwrap();
    assert_eq!(page.entities.len(), 100);
    assert!(page.next_link.is_none());
}

#[test]
fn test_count_is_taken_before_paging() {
    let catalog = school_catalog();
    let operations = registry(students(250), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let options = QueryOptions::new()
        .with_filter(prop("Age").ge(lit_int(20)))
        .with_skip(5)
        .with_top(10)
        .with_count(true);
    let page = pipeline
        .read_collection(&students_request(options, None))
        .unwrap();

    // Six of every ten students are 20 or older.
    assert_eq!(page.count, Some(150));
    assert_eq!(page.entities.len(), 10);
    assert!(page.next_link.is_none());
}

#[test]
fn test_delegated_paging_leaves_slicing_to_backend() {
    let catalog = school_catalog();
    let operations = registry(students(30), Vec::new());
    let policy = PagingPolicy::new(100).delegating_skip().delegating_top();
    let pipeline = ReadPipeline::new(&catalog, &operations).with_paging(policy);

    let options = QueryOptions::new()
        .with_order_by(OrderByItem::asc(prop("Id")))
        .with_skip(5)
        .with_top(3)
        .with_count(true);
    let page = pipeline
        .read_collection(&students_request(options, None))
        .unwrap();

    assert_eq!(
        ids(&page),
        vec!["Students(Id=6)", "Students(Id=7)", "Students(Id=8)"]
    );
    assert_eq!(page.count, Some(30));
}

#[test]
fn test_expand_inlines_navigation() {
    let catalog = school_catalog();
    let student = student_record(1, "Ann", 20, "A").with(
        "courses",
        Value::Collection(vec![Value::Entity(course_record(10, "Algebra"))]),
    );
    let operations = registry(vec![student], Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let options = QueryOptions::new().with_expand(ExpandOption::of(&["Courses"]));
    let page = pipeline
        .read_collection(&students_request(options, None))
        .unwrap();

    let link = page.entities[0].link("Courses").unwrap();
    assert!(matches!(&link.inline, WireInline::EntitySet(courses) if courses.len() == 1));
}

#[test]
fn test_filter_through_missing_navigation_does_not_match() {
    let catalog = catalog(common::person_chain());
    let orphan = Record::new("Person").with("id", 1_i64).with("name", "Joe");
    let grandchild = Record::new("Person").with("id", 2_i64).with(
        "parent",
        Value::Entity(Record::new("Parent").with("id", 5_i64).with(
            "child",
            Value::Entity(Record::new("Child").with("id", 9_i64).with("name", "Joe")),
        )),
    );
    let operations = OperationRegistry::new().with(RepositoryOperation::new(
        "Person",
        MemoryExecutor::new(vec![orphan, grandchild]),
    ));
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let options = QueryOptions::new().with_filter(
        member(vec![nav("Parent"), nav("Child"), primitive("Name")]).eq(lit_str("Joe")),
    );
    let page = pipeline
        .read_collection(&CollectionRequest::new("People", options))
        .unwrap();

    assert_eq!(ids(&page), vec!["People(Id=2)"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unknown_entity_set() {
    let catalog = school_catalog();
    let operations = registry(Vec::new(), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let err = pipeline
        .read_collection(&CollectionRequest::new("Teachers", QueryOptions::new()))
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    insta::assert_snapshot!(err.to_string(), @"Unknown entity set: Teachers");
}

#[test]
fn test_missing_operation() {
    let catalog = school_catalog();
    let operations = OperationRegistry::new()
        .with(RepositoryOperation::new("Student", MemoryExecutor::new(students(3))));
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let err = pipeline
        .read_collection(&CollectionRequest::new("Courses", QueryOptions::new()))
        .unwrap_err();
    assert!(matches!(err, RequestError::MissingOperation(ref t) if t == "Course"));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_unsupported_filter_is_not_implemented() {
    let catalog = school_catalog();
    let operations = registry(students(3), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let options = QueryOptions::new().with_filter(prop("Age").lt(lit_null()));
    let failure = pipeline
        .read_collection(&students_request(options, None))
        .unwrap_err()
        .into_failure();
    assert_eq!(failure.status, 501);
}

// =============================================================================
// Single entities
// =============================================================================

#[test]
fn test_read_entity_by_key() {
    let catalog = school_catalog();
    let operations = registry(students(5), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let entity = pipeline
        .read_entity("Students", &[KeyPredicate::new("Id", "3")], &QueryOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(entity.id.as_deref(), Some("Students(Id=3)"));

    let absent = pipeline
        .read_entity("Students", &[KeyPredicate::new("Id", "99")], &QueryOptions::new())
        .unwrap();
    assert!(absent.is_none());
}

#[test]
fn test_read_entity_with_bad_key() {
    let catalog = school_catalog();
    let operations = registry(students(5), Vec::new());
    let pipeline = ReadPipeline::new(&catalog, &operations);

    let err = pipeline
        .read_entity("Students", &[KeyPredicate::new("Nope", "3")], &QueryOptions::new())
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = pipeline
        .read_entity("Students", &[KeyPredicate::new("Id", "three")], &QueryOptions::new())
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_read_navigation_through_parent() {
    let catalog = school_catalog();
    let student = student_record(1, "Ann", 20, "A").with(
        "courses",
        Value::Collection(vec![
            Value::Entity(course_record(10, "Algebra")),
            Value::Entity(course_record(11, "Biology")),
        ]),
    );
    let operations = registry(
        vec![student],
        vec![
            course_record(10, "Algebra"),
            course_record(11, "Biology"),
            course_record(12, "Chemistry"),
        ],
    );
    let pipeline = ReadPipeline::new(&catalog, &operations);
    let parent = [KeyPredicate::new("Id", "1")];

    let course = pipeline
        .read_navigation(
            "Students",
            &parent,
            "Courses",
            &[KeyPredicate::new("Id", "11")],
            &QueryOptions::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(course.id.as_deref(), Some("Courses(Id=11)"));

    // Course 12 exists but Ann does not take it.
    let unrelated = pipeline
        .read_navigation(
            "Students",
            &parent,
            "Courses",
            &[KeyPredicate::new("Id", "12")],
            &QueryOptions::new(),
        )
        .unwrap();
    assert!(unrelated.is_none());

    let err = pipeline
        .read_navigation(
            "Students",
            &parent,
            "Teachers",
            &[KeyPredicate::new("Id", "1")],
            &QueryOptions::new(),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
