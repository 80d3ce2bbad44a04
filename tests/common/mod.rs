//! Shared fixture model for the integration tests.
#![allow(dead_code)]

use cicada::backend::{MemoryExecutor, RepositoryOperation};
use cicada::catalog::{Catalog, CatalogConfig, MetadataCatalog};
use cicada::config::Settings;
use cicada::marshal::{Record, Value};
use cicada::model::types::{int32, int64, string};
use cicada::model::{EntityTypeTag, FieldDescriptor, TypeDescriptor, ValueType};
use cicada::pipeline::OperationRegistry;
use cicada::Service;

pub const NAMESPACE: &str = "com.example.school";

pub fn config() -> CatalogConfig {
    CatalogConfig::new(NAMESPACE, "Container").with_service_root("http://localhost/odata")
}

pub fn catalog(types: Vec<TypeDescriptor>) -> Catalog {
    MetadataCatalog::new(config())
        .initialize(types)
        .expect("fixture catalog")
}

// =============================================================================
// School model
// =============================================================================

pub fn grade() -> TypeDescriptor {
    TypeDescriptor::enumeration("Grade", &["A", "B", "C"])
}

pub fn address() -> TypeDescriptor {
    TypeDescriptor::complex("Address")
        .field(FieldDescriptor::property("street", string()).named("Street"))
        .field(FieldDescriptor::property("city", string()).named("City"))
}

pub fn course() -> TypeDescriptor {
    TypeDescriptor::entity("Course", &["Id"])
        .entity_set("Courses")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("title", string()).named("Title"))
}

pub fn student() -> TypeDescriptor {
    TypeDescriptor::entity("Student", &["Id"])
        .entity_set("Students")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("name", string()).named("Name"))
        .field(FieldDescriptor::property("age", int32()).named("Age"))
        .field(FieldDescriptor::property("grade", ValueType::enumeration("Grade")).named("Grade"))
        .field(FieldDescriptor::property("address", ValueType::complex("Address")).named("Address"))
        .field(
            FieldDescriptor::navigation("courses", ValueType::collection(ValueType::entity("Course")))
                .named("Courses"),
        )
}

pub fn school() -> Vec<TypeDescriptor> {
    vec![grade(), address(), course(), student()]
}

// =============================================================================
// Person chain
// =============================================================================

pub fn person_chain() -> Vec<TypeDescriptor> {
    let child = TypeDescriptor::entity("Child", &["Id"])
        .entity_set("Children")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("name", string()).named("Name"));
    let parent = TypeDescriptor::entity("Parent", &["Id"])
        .entity_set("Parents")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::navigation("child", ValueType::entity("Child")).named("Child"));
    let person = TypeDescriptor::entity("Person", &["Id"])
        .entity_set("People")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::navigation("parent", ValueType::entity("Parent")).named("Parent"));
    vec![child, parent, person]
}

/// `Manager` inherits `Address` from `Employee` through the `employee` link.
pub fn supertype_scenario() -> Vec<TypeDescriptor> {
    let employee = TypeDescriptor::entity("Employee", &["Id"])
        .entity_set("Employees")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("address", ValueType::complex("Address")).named("Address"));
    let manager = TypeDescriptor::new("Manager")
        .with_entity_type(EntityTypeTag::new(&["Id"]).with_super_entity("employee"))
        .entity_set("Managers")
        .inherit(&employee)
        .field(FieldDescriptor::property("level", int32()).named("Level"));
    vec![address(), employee, manager]
}

// =============================================================================
// Records
// =============================================================================

pub fn course_record(id: i64, title: &str) -> Record {
    Record::new("Course").with("id", id).with("title", title)
}

pub fn student_record(id: i64, name: &str, age: i32, grade: &str) -> Record {
    Record::new("Student")
        .with("id", id)
        .with("name", name)
        .with("age", age)
        .with("grade", Value::enumeration(grade))
        .with(
            "address",
            Value::Complex(
                Record::new("Address")
                    .with("street", format!("{} Main St", id))
                    .with("city", "Boston"),
            ),
        )
}

/// `count` students with ids from 1, ages cycling 16..=25.
pub fn students(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let grades = ["A", "B", "C"];
            student_record(
                i as i64 + 1,
                &format!("Student {:03}", i + 1),
                16 + (i % 10) as i32,
                grades[i % grades.len()],
            )
        })
        .collect()
}

pub fn registry(students: Vec<Record>, courses: Vec<Record>) -> OperationRegistry {
    OperationRegistry::new()
        .with(RepositoryOperation::new("Student", MemoryExecutor::new(students)))
        .with(RepositoryOperation::new("Course", MemoryExecutor::new(courses)))
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.service.namespace = NAMESPACE.to_string();
    settings
}

pub fn school_service(students: Vec<Record>, courses: Vec<Record>) -> Service {
    let builder = school()
        .into_iter()
        .fold(Service::builder(settings()), |b, desc| b.descriptor(desc));
    builder
        .operation(RepositoryOperation::new("Student", MemoryExecutor::new(students)))
        .operation(RepositoryOperation::new("Course", MemoryExecutor::new(courses)))
        .build()
        .expect("school service")
}
