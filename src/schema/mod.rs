//! CSDL schema provider.
//!
//! Renders the catalog as an entity data model document:
//!
//! ```text
//! Catalog ──▶ SchemaCompiler ──▶ CsdlSchema
//!                                 ├── EntityType / ComplexType / EnumType
//!                                 ├── Action / Function
//!                                 └── EntityContainer
//!                                      ├── EntitySet (+ NavigationPropertyBinding)
//!                                      └── ActionImport / FunctionImport
//! ```

pub mod compiler;
pub mod csdl;
pub mod error;

pub use compiler::SchemaCompiler;
pub use csdl::*;
pub use error::{SchemaError, SchemaResult};
