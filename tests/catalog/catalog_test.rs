#[path = "../common/mod.rs"]
mod common;

use cicada::catalog::{CatalogHandle, Category, MetadataCatalog, ScanError};
use cicada::model::{EnumTypeTag, FullQualifiedName, TypeDescriptor};

use common::{catalog, config, school, student, NAMESPACE};

#[test]
fn test_every_category_is_indexed() {
    let catalog = catalog(school());

    assert_eq!(catalog.len(Category::EntitySet), 2);
    assert_eq!(catalog.len(Category::EntityType), 2);
    assert_eq!(catalog.len(Category::ComplexType), 1);
    assert_eq!(catalog.len(Category::EnumType), 1);
    assert_eq!(catalog.len(Category::Action), 0);

    assert_eq!(catalog.entity_set("Students").unwrap().type_name, "Student");
    assert_eq!(catalog.complex_type("Address").unwrap().type_name, "Address");
    assert!(catalog.entity_set("Student").is_none());
}

#[test]
fn test_registration_order_is_kept() {
    let catalog = catalog(school());
    let sets: Vec<&str> = catalog
        .iter(Category::EntitySet)
        .map(|(name, _)| name)
        .collect();
    assert_eq!(sets, vec!["Courses", "Students"]);
}

#[test]
fn test_explicit_names_win_over_type_names() {
    let grade = TypeDescriptor::new("GradeKind").with_enum_type(
        EnumTypeTag::new(&["A", "B"])
            .named("Grade")
            .with_namespace("com.example.grades"),
    );
    let catalog = catalog(vec![grade]);

    let desc = catalog.enum_type("Grade").unwrap();
    assert_eq!(desc.type_name, "GradeKind");
    assert!(catalog.enum_type("GradeKind").is_none());
    assert_eq!(
        catalog.enum_type_fqn(desc),
        Some(FullQualifiedName::new("com.example.grades", "Grade"))
    );
    assert_eq!(catalog.enum_tag("GradeKind").unwrap().members.len(), 2);
}

#[test]
fn test_default_namespace_and_container() {
    let catalog = catalog(school());
    let desc = catalog.entity_type("Student").unwrap();

    assert_eq!(
        catalog.entity_type_fqn(desc).unwrap().to_string(),
        format!("{}.Student", NAMESPACE)
    );
    assert_eq!(
        catalog.container_fqn(),
        FullQualifiedName::new(NAMESPACE, "Container")
    );
    assert_eq!(catalog.entity_set_of("Student"), Some("Students"));
}

#[test]
fn test_collision_replaces_earlier_registration() {
    let pupil = TypeDescriptor::entity("Pupil", &["Id"]).entity_set("Students");
    let catalog = catalog(vec![student(), pupil]);

    assert_eq!(catalog.entity_set("Students").unwrap().type_name, "Pupil");
    // The loser keeps its entity type registration.
    assert_eq!(catalog.entity_type("Student").unwrap().type_name, "Student");
}

#[test]
fn test_strict_mode_rejects_collision() {
    let pupil = TypeDescriptor::entity("Pupil", &["Id"]).entity_set("Students");
    let err = MetadataCatalog::new(config())
        .strict()
        .initialize(vec![student(), pupil])
        .unwrap_err();

    assert!(matches!(
        err,
        ScanError::Conflict { category: Category::EntitySet, ref name, .. } if name == "Students"
    ));
    insta::assert_snapshot!(err.to_string(), @"entity set Students is declared by both Student and Pupil");
}

#[test]
fn test_scan_errors() {
    let err = MetadataCatalog::new(config())
        .initialize(vec![TypeDescriptor::new("  ")])
        .unwrap_err();
    assert!(matches!(err, ScanError::EmptyTypeName));

    let err = MetadataCatalog::new(config())
        .initialize(vec![TypeDescriptor::new("Plain")])
        .unwrap_err();
    assert!(matches!(err, ScanError::Untagged(ref name) if name == "Plain"));
}

#[test]
fn test_published_catalog_leaves_snapshots_alone() {
    let handle = CatalogHandle::new(catalog(vec![student()]));
    let before = handle.snapshot();

    handle.publish(catalog(school()));
    let after = handle.snapshot();

    assert!(before.entity_set("Courses").is_none());
    assert!(after.entity_set("Courses").is_some());
    assert_eq!(before.len(Category::EntitySet), 1);
}

#[test]
fn test_snapshots_during_concurrent_publish() {
    let handle = CatalogHandle::new(catalog(vec![student()]));

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..200)
                        .map(|_| handle.snapshot().len(Category::EntitySet))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for i in 0..50 {
            let types = if i % 2 == 0 { school() } else { vec![student()] };
            handle.publish(catalog(types));
        }

        for reader in readers {
            let seen = reader.join().unwrap();
            assert!(seen.iter().all(|n| *n == 1 || *n == 2));
        }
    });
}
