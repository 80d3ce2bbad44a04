//! # Cicada
//!
//! A typed entity-model serving core: domain types declare their metadata,
//! Cicada turns it into a protocol schema and answers paged, filtered reads.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Domain types (Describe → TypeDescriptor)       │
//! │  (entity types, entity sets, complex types, enums, ops)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Catalog (name tables per category)          │
//! └─────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼ [schema]                     ▼ [pipeline]
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  CSDL schema document     │   │  ReadPipeline                 │
//! │  + service document       │   │  query → predicate [query]    │
//! └──────────────────────────┘   │  executor          [backend]  │
//!                                 │  records → wire    [marshal]  │
//!                                 └──────────────────────────────┘
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod marshal;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod service;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{MemoryExecutor, PredicateExecutor, RepositoryOperation};
    pub use crate::catalog::{Catalog, CatalogConfig, CatalogHandle, MetadataCatalog};
    pub use crate::config::Settings;
    pub use crate::marshal::{
        EntityMarshaller, Record, Structured, Value, WireCollection, WireEntity,
    };
    pub use crate::model::types::{
        boolean, date, date_time, decimal, double, int32, int64, string,
    };
    pub use crate::model::{
        describe, Describe, EnumTypeTag, FieldDescriptor, FullQualifiedName, TypeDescriptor,
        ValueType,
    };
    pub use crate::pipeline::{
        CollectionRequest, EntityOperation, KeyPredicate, OperationRegistry, ReadPipeline,
        RequestError,
    };
    pub use crate::query::expr::{
        complex, enum_lit, lit, lit_bool, lit_int, lit_long, lit_null, lit_str, member, nav,
        primitive, prop,
    };
    pub use crate::query::{ExpandOption, FilterExpr, OrderByItem, QueryOptions};
    pub use crate::schema::SchemaCompiler;
    pub use crate::service::{Service, ServiceBuilder, TypeDiscovery};
}

pub use catalog::{Catalog, MetadataCatalog};
pub use schema::SchemaCompiler;
pub use service::{Service, ServiceError, TypeDiscovery};
