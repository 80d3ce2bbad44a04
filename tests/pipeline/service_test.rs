#[path = "../common/mod.rs"]
mod common;

use cicada::catalog::{Category, ScanError};
use cicada::config::SettingsError;
use cicada::model::types::int64;
use cicada::model::{FieldDescriptor, TypeDescriptor};
use cicada::pipeline::{CollectionRequest, KeyPredicate};
use cicada::query::QueryOptions;
use cicada::schema::SchemaError;
use cicada::{Service, ServiceError, TypeDiscovery};

use common::{course, course_record, school, school_service, settings, student, students};

#[test]
fn test_build_publishes_validated_catalog() {
    let service = school_service(students(3), vec![course_record(1, "Drama")]);
    let catalog = service.catalog();

    assert_eq!(catalog.len(Category::EntitySet), 2);
    assert_eq!(service.operations().len(), 2);
    assert_eq!(
        service.service_document().entity_sets,
        vec!["Courses", "Students"]
    );
}

#[test]
fn test_metadata_document() {
    let service = school_service(Vec::new(), Vec::new());
    let schemas = service.metadata().unwrap();

    assert_eq!(schemas.len(), 1);
    let schema = &schemas[0];
    assert_eq!(schema.namespace, common::NAMESPACE);
    let names: Vec<&str> = schema.entity_types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Course", "Student"]);
    assert!(schema.entity_container.is_some());
}

#[test]
fn test_reads_go_through_current_catalog() {
    let service = school_service(students(3), Vec::new());

    let page = service
        .read_collection(&CollectionRequest::new("Students", QueryOptions::new()))
        .unwrap();
    assert_eq!(page.entities.len(), 3);

    let entity = service
        .read_entity("Students", &[KeyPredicate::new("Id", "2")], &QueryOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(entity.id.as_deref(), Some("Students(Id=2)"));
}

#[test]
fn test_reload_swaps_catalog() {
    let service = school_service(students(3), Vec::new());
    let before = service.catalog();

    service.reload(vec![course()]).unwrap();

    assert!(before.entity_set("Students").is_some());
    assert!(service.catalog().entity_set("Students").is_none());
    let err = service
        .read_collection(&CollectionRequest::new("Students", QueryOptions::new()))
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_failed_reload_keeps_current_catalog() {
    let service = school_service(students(3), Vec::new());
    let keyless = TypeDescriptor::entity("Keyless", &[]).entity_set("Keyless");

    let err = service.reload(vec![keyless]).unwrap_err();
    assert!(matches!(err, ServiceError::Schema(SchemaError::EmptyKey { .. })));
    assert!(service.catalog().entity_set("Students").is_some());
}

#[test]
fn test_empty_key_fails_at_build() {
    let keyless = TypeDescriptor::entity("Keyless", &[])
        .entity_set("Keyless")
        .field(FieldDescriptor::property("id", int64()).named("Id"));
    let err = Service::builder(settings())
        .descriptor(keyless)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ServiceError::Schema(SchemaError::EmptyKey { ref entity }) if entity == "Keyless"));
}

#[test]
fn test_strict_build_rejects_collision() {
    let pupil = TypeDescriptor::entity("Pupil", &["Id"])
        .entity_set("Students")
        .field(FieldDescriptor::property("id", int64()).named("Id"));
    let builder = school()
        .into_iter()
        .fold(Service::builder(settings()).strict(), |b, d| b.descriptor(d));
    let err = builder.descriptor(pupil).build().err().unwrap();

    assert!(matches!(err, ServiceError::Scan(ScanError::Conflict { .. })));
}

#[test]
fn test_invalid_settings_fail_at_build() {
    let mut settings = settings();
    settings.paging.max_page_size = 0;
    let err = Service::builder(settings)
        .descriptor(student())
        .build()
        .err()
        .unwrap();

    assert!(matches!(err, ServiceError::Settings(SettingsError::InvalidConfig(_))));
    insta::assert_snapshot!(err.to_string(), @"Settings error: Invalid configuration: paging.max_page_size must be at least 1");
}

#[test]
fn test_discovery_is_scoped_by_root_package() {
    let discovery = |scope: Option<&str>| match scope {
        Some("com.example.school") => school(),
        _ => Vec::new(),
    };
    assert!(discovery.discover(None).is_empty());

    let mut settings = settings();
    settings.service.root_package = Some("com.example.school".to_string());
    let service = Service::builder(settings)
        .discover(&discovery)
        .build()
        .unwrap_or_else(|e| panic!("build failed: {}", e));

    let catalog = service.catalog();
    assert_eq!(catalog.root_package(), Some("com.example.school"));
    assert!(catalog.entity_set("Students").is_some());
    assert!(catalog.entity_set("Courses").is_some());
}
