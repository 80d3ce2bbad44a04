#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use cicada::marshal::{
    EntityMarshaller, MarshalError, MarshalResult, PrimitiveValue, Record, Structured, Value,
    ValueKind, WireInline, WireValue,
};
use cicada::model::types::{date, int32, int64, string};
use cicada::model::{Describe, FieldDescriptor, TypeDescriptor, ValueType};
use cicada::query::ExpandOption;
use cicada::schema::SchemaError;

use common::{catalog, course_record, school, student_record};

// =============================================================================
// Record -> wire
// =============================================================================

#[test]
fn test_entity_properties_and_id() {
    let catalog = catalog(school());
    let marshaller = EntityMarshaller::new(&catalog);

    let entity = marshaller
        .to_wire_entity(&student_record(7, "Joe", 20, "B"), None)
        .unwrap();

    assert_eq!(entity.type_name, "com.example.school.Student");
    assert_eq!(entity.id.as_deref(), Some("Students(Id=7)"));

    let names: Vec<&str> = entity.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Id", "Name", "Age", "Grade", "Address"]);
    assert_eq!(
        entity.property("Age").unwrap().value,
        WireValue::Primitive(PrimitiveValue::Int32(20))
    );
}

#[test]
fn test_enum_travels_as_ordinal() {
    let catalog = catalog(school());
    let entity = EntityMarshaller::new(&catalog)
        .to_wire_entity(&student_record(1, "Ann", 19, "B"), None)
        .unwrap();

    let grade = entity.property("Grade").unwrap();
    assert_eq!(grade.kind, ValueKind::Enum);
    assert_eq!(grade.type_name, "com.example.school.Grade");
    assert_eq!(grade.value, WireValue::Enum(1));
}

#[test]
fn test_complex_property() {
    let catalog = catalog(school());
    let entity = EntityMarshaller::new(&catalog)
        .to_wire_entity(&student_record(3, "Ann", 19, "A"), None)
        .unwrap();

    let address = entity.property("Address").unwrap();
    assert_eq!(address.kind, ValueKind::Complex);
    let WireValue::Complex(complex) = &address.value else {
        panic!("expected complex value, got {:?}", address.value);
    };
    assert_eq!(complex.type_name, "com.example.school.Address");
    assert_eq!(
        complex.properties[1].value,
        WireValue::Primitive(PrimitiveValue::String("Boston".into()))
    );
}

#[test]
fn test_unset_fields_marshal_as_null() {
    let catalog = catalog(school());
    let record = Record::new("Student").with("id", 4_i64);
    let entity = EntityMarshaller::new(&catalog)
        .to_wire_entity(&record, None)
        .unwrap();

    assert_eq!(entity.property("Name").unwrap().value, WireValue::Null);
    assert_eq!(entity.property("Address").unwrap().value, WireValue::Null);
    assert_eq!(entity.id.as_deref(), Some("Students(Id=4)"));
}

#[test]
fn test_no_id_without_key_value() {
    let catalog = catalog(school());
    let record = Record::new("Student").with("name", "Nobody");
    let entity = EntityMarshaller::new(&catalog)
        .to_wire_entity(&record, None)
        .unwrap();
    assert!(entity.id.is_none());
}

#[test]
fn test_collections_and_dates() {
    let diary = TypeDescriptor::entity("Diary", &["Id"])
        .entity_set("Diaries")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(FieldDescriptor::property("tags", ValueType::collection(string())).named("Tags"))
        .field(FieldDescriptor::property("opened", date()).named("Opened"));
    let catalog = catalog(vec![diary]);

    let record = Record::new("Diary")
        .with("id", 1_i64)
        .with("tags", vec!["a", "b"])
        .with("opened", NaiveDate::from_ymd_opt(2021, 3, 4).unwrap());
    let entity = EntityMarshaller::new(&catalog)
        .to_wire_entity(&record, None)
        .unwrap();

    let tags = entity.property("Tags").unwrap();
    assert_eq!(tags.type_name, "Collection(Edm.String)");
    assert_eq!(tags.kind, ValueKind::CollectionPrimitive);

    let opened = serde_json::to_value(&entity.property("Opened").unwrap().value).unwrap();
    insta::assert_snapshot!(opened.to_string(), @r#""2021-03-04T00:00:00Z""#);
}

#[test]
fn test_primitive_type_override_on_the_wire() {
    let meter = TypeDescriptor::entity("Meter", &["Id"])
        .entity_set("Meters")
        .field(FieldDescriptor::property("id", int64()).named("Id"))
        .field(
            FieldDescriptor::property("reading", int32())
                .named("Reading")
                .with_type("Edm.Int64"),
        );
    let catalog = catalog(vec![meter]);
    let marshaller = EntityMarshaller::new(&catalog);
    let record = Record::new("Meter")
        .with("id", 1_i64)
        .with("reading", 42_i32);

    let entity = marshaller.to_wire_entity(&record, None).unwrap();
    let reading = entity.property("Reading").unwrap();
    assert_eq!(reading.type_name, "Edm.Int64");
    assert_eq!(reading.value, WireValue::Primitive(PrimitiveValue::Int64(42)));

    let back = marshaller.from_wire_entity(&entity, "Meter").unwrap();
    assert_eq!(back, record);
}

// =============================================================================
// Navigation links
// =============================================================================

#[test]
fn test_navigation_only_when_expanded() {
    let catalog = catalog(school());
    let marshaller = EntityMarshaller::new(&catalog);
    let record = student_record(1, "Ann", 19, "A").with(
        "courses",
        Value::Collection(vec![
            Value::Entity(course_record(10, "Algebra")),
            Value::Entity(course_record(11, "Biology")),
        ]),
    );

    let plain = marshaller.to_wire_entity(&record, None).unwrap();
    assert!(plain.navigation_links.is_empty());

    let expanded = marshaller
        .to_wire_entity(&record, Some(&ExpandOption::of(&["Courses"])))
        .unwrap();
    let link = expanded.link("Courses").unwrap();
    let WireInline::EntitySet(courses) = &link.inline else {
        panic!("expected an inline entity set");
    };
    let ids: Vec<_> = courses.iter().filter_map(|c| c.id.as_deref()).collect();
    assert_eq!(ids, vec!["Courses(Id=10)", "Courses(Id=11)"]);
}

#[test]
fn test_single_navigation_null_is_omitted() {
    let catalog = catalog(common::person_chain());
    let marshaller = EntityMarshaller::new(&catalog);
    let expand = ExpandOption::of(&["Parent"]);

    let orphan = Record::new("Person").with("id", 1_i64);
    let entity = marshaller.to_wire_entity(&orphan, Some(&expand)).unwrap();
    assert!(entity.link("Parent").is_none());

    let person = Record::new("Person")
        .with("id", 2_i64)
        .with("parent", Value::Entity(Record::new("Parent").with("id", 5_i64)));
    let entity = marshaller.to_wire_entity(&person, Some(&expand)).unwrap();
    let link = entity.link("Parent").unwrap();
    assert_eq!(link.type_name.as_deref(), Some("com.example.school.Parent"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unknown_enum_member() {
    let catalog = catalog(school());
    let err = EntityMarshaller::new(&catalog)
        .to_wire_entity(&student_record(1, "Ann", 19, "Z"), None)
        .unwrap_err();
    assert!(matches!(err, MarshalError::UnknownEnumMember { ref member, .. } if member == "Z"));
}

#[test]
fn test_value_mismatch() {
    let catalog = catalog(school());
    let record = Record::new("Student").with("id", 1_i64).with("age", "twenty");
    let err = EntityMarshaller::new(&catalog)
        .to_wire_entity(&record, None)
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Field Student.age expects Edm.Int32, found string");
}

#[test]
fn test_entity_type_without_set() {
    let loose = TypeDescriptor::entity("Loose", &["Id"])
        .field(FieldDescriptor::property("id", int64()).named("Id"));
    let catalog = catalog(vec![loose]);
    let err = EntityMarshaller::new(&catalog)
        .to_wire_entity(&Record::new("Loose").with("id", 1_i64), None)
        .unwrap_err();
    assert!(matches!(err, MarshalError::Schema(SchemaError::MissingEntitySet(_))));
}

#[test]
fn test_enum_is_not_structured() {
    let catalog = catalog(school());
    let err = EntityMarshaller::new(&catalog)
        .to_wire_entity(&Record::new("Grade"), None)
        .unwrap_err();
    assert!(matches!(err, MarshalError::NotStructured(ref name) if name == "Grade"));
}

// =============================================================================
// Wire -> record
// =============================================================================

#[test]
fn test_round_trip_through_wire() {
    let catalog = catalog(school());
    let marshaller = EntityMarshaller::new(&catalog);
    let record = student_record(9, "Grace", 22, "C").with(
        "courses",
        Value::Collection(vec![Value::Entity(course_record(1, "Drama"))]),
    );

    let entity = marshaller
        .to_wire_entity(&record, Some(&ExpandOption::of(&["Courses"])))
        .unwrap();
    let back = marshaller.from_wire_entity(&entity, "Student").unwrap();

    assert_eq!(back, record);
}

#[test]
fn test_unknown_ordinal_on_the_way_back() {
    let catalog = catalog(school());
    let marshaller = EntityMarshaller::new(&catalog);
    let mut entity = marshaller
        .to_wire_entity(&student_record(1, "Ann", 19, "A"), None)
        .unwrap();
    entity.properties[3].value = WireValue::Enum(9);

    let err = marshaller.from_wire_entity(&entity, "Student").unwrap_err();
    assert!(matches!(err, MarshalError::UnknownEnumOrdinal { ordinal: 9, .. }));
}

// =============================================================================
// Domain types
// =============================================================================

#[derive(Debug, PartialEq)]
struct Course {
    id: i64,
    title: String,
}

impl Describe for Course {
    fn descriptor() -> TypeDescriptor {
        common::course()
    }
}

impl Structured for Course {
    fn to_record(&self) -> Record {
        Record::new("Course")
            .with("id", self.id)
            .with("title", self.title.as_str())
    }

    fn from_record(record: &Record) -> MarshalResult<Self> {
        let id = record.get("id").and_then(Value::as_i64).ok_or_else(|| {
            MarshalError::ValueMismatch {
                owner: "Course".into(),
                field: "id".into(),
                expected: "Edm.Int64".into(),
                found: "null".into(),
            }
        })?;
        let title = record
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self { id, title })
    }
}

#[test]
fn test_structured_domain_type() {
    let catalog = catalog(vec![cicada::model::describe::<Course>()]);
    let marshaller = EntityMarshaller::new(&catalog);
    let course = Course {
        id: 3,
        title: "Biology".into(),
    };

    let entity = marshaller.to_wire_entity(&course.to_record(), None).unwrap();
    assert_eq!(entity.id.as_deref(), Some("Courses(Id=3)"));

    let back = marshaller.from_wire_entity(&entity, "Course").unwrap();
    assert_eq!(Course::from_record(&back).unwrap(), course);
}
