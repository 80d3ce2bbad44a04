//! Type descriptor model.
//!
//! In-memory representation of the entity model: entity types, complex
//! types, enumerations, operations and their fields, as declared by domain
//! types at registration time.

pub mod descriptor;
pub mod naming;
pub mod tags;
pub mod types;

pub use descriptor::{describe, Describe, FieldDescriptor, TypeDescriptor};
pub use naming::{collection_of, strip_collection, FullQualifiedName};
pub use tags::{
    ComplexTypeTag, EntitySetTag, EntityTypeTag, EnumMember, EnumTypeTag, FieldTag, ImportTag,
    NavigationTag, OperationTag, ParameterTag, PersistenceMapping, PropertyTag, ReturnTypeTag,
};
pub use types::{PrimitiveKind, ValueType};
