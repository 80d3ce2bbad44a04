//! Service bootstrap.
//!
//! Wires settings, domain type descriptors and entity operations into a
//! running service:
//!
//! ```text
//! Settings ──┐
//!            ├─▶ MetadataCatalog::initialize ─▶ SchemaCompiler::validate ─▶ CatalogHandle
//! [Describe] ┘                                                                  │
//!                                                          snapshot per request ▼
//!                                           ReadPipeline / SchemaCompiler ◀── Arc<Catalog>
//! ```
//!
//! The schema is validated before a catalog is published, so a structural
//! error (empty key, unknown type reference) surfaces at startup or reload
//! and never from a request.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogHandle, Category, MetadataCatalog, ScanError};
use crate::config::{Settings, SettingsError};
use crate::marshal::{WireCollection, WireEntity};
use crate::model::{describe, Describe, TypeDescriptor};
use crate::pipeline::{
    CollectionRequest, EntityOperation, KeyPredicate, OperationRegistry, ReadPipeline,
    RequestResult,
};
use crate::query::QueryOptions;
use crate::schema::{CsdlSchema, SchemaCompiler, SchemaError, ServiceDocument};

/// Bootstrap failed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Catalog error: {0}")]
    Scan(#[from] ScanError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Finds the domain types to register, scoped by the configured root package.
pub trait TypeDiscovery {
    fn discover(&self, root_package: Option<&str>) -> Vec<TypeDescriptor>;
}

impl<F> TypeDiscovery for F
where
    F: Fn(Option<&str>) -> Vec<TypeDescriptor>,
{
    fn discover(&self, root_package: Option<&str>) -> Vec<TypeDescriptor> {
        self(root_package)
    }
}

/// Collects descriptors and operations for a [`Service`].
#[must_use = "builders have no effect until used"]
pub struct ServiceBuilder {
    settings: Settings,
    descriptors: Vec<TypeDescriptor>,
    operations: OperationRegistry,
    strict: bool,
}

impl ServiceBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            descriptors: Vec::new(),
            operations: OperationRegistry::new(),
            strict: false,
        }
    }

    /// Register a domain type through its [`Describe`] impl.
    pub fn register<T: Describe>(self) -> Self {
        self.descriptor(describe::<T>())
    }

    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Register every type `discovery` finds under `service.root_package`.
    pub fn discover(mut self, discovery: &impl TypeDiscovery) -> Self {
        let scope = self.settings.service.root_package.as_deref();
        let found = discovery.discover(scope);
        debug!(
            "{} types discovered under {}",
            found.len(),
            scope.unwrap_or("every package")
        );
        self.descriptors.extend(found);
        self
    }

    pub fn operation(mut self, operation: impl EntityOperation + 'static) -> Self {
        self.operations.register(Arc::new(operation));
        self
    }

    /// Fail on name collisions instead of letting the last registration win.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn build(self) -> ServiceResult<Service> {
        self.settings.validate()?;
        let catalog = build_catalog(&self.settings, self.strict, self.descriptors)?;
        Ok(Service {
            settings: self.settings,
            strict: self.strict,
            catalog: CatalogHandle::new(catalog),
            operations: self.operations,
        })
    }
}

/// A running service: the published catalog plus the operation registry.
pub struct Service {
    settings: Settings,
    strict: bool,
    catalog: CatalogHandle,
    operations: OperationRegistry,
}

impl Service {
    pub fn builder(settings: Settings) -> ServiceBuilder {
        ServiceBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    /// Build and validate a new catalog, then publish it.
    ///
    /// On error the current catalog stays in place.
    pub fn reload(&self, descriptors: Vec<TypeDescriptor>) -> ServiceResult<()> {
        let catalog = build_catalog(&self.settings, self.strict, descriptors)?;
        self.catalog.publish(catalog);
        Ok(())
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn metadata(&self) -> ServiceResult<Vec<CsdlSchema>> {
        let catalog = self.catalog();
        Ok(SchemaCompiler::new(&catalog).resolve_schemas()?)
    }

    pub fn service_document(&self) -> ServiceDocument {
        let catalog = self.catalog();
        SchemaCompiler::new(&catalog).service_document()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn read_collection(&self, request: &CollectionRequest) -> RequestResult<WireCollection> {
        let catalog = self.catalog();
        self.pipeline(&catalog).read_collection(request)
    }

    pub fn read_entity(
        &self,
        entity_set: &str,
        keys: &[KeyPredicate],
        options: &QueryOptions,
    ) -> RequestResult<Option<WireEntity>> {
        let catalog = self.catalog();
        self.pipeline(&catalog).read_entity(entity_set, keys, options)
    }

    pub fn read_navigation(
        &self,
        entity_set: &str,
        keys: &[KeyPredicate],
        navigation: &str,
        target_keys: &[KeyPredicate],
        options: &QueryOptions,
    ) -> RequestResult<Option<WireEntity>> {
        let catalog = self.catalog();
        self.pipeline(&catalog)
            .read_navigation(entity_set, keys, navigation, target_keys, options)
    }

    fn pipeline<'a>(&'a self, catalog: &'a Catalog) -> ReadPipeline<'a> {
        ReadPipeline::new(catalog, &self.operations).with_paging(self.settings.paging_policy())
    }
}

fn build_catalog(
    settings: &Settings,
    strict: bool,
    descriptors: Vec<TypeDescriptor>,
) -> ServiceResult<Catalog> {
    let mut scanner = MetadataCatalog::new(settings.catalog_config());
    if strict {
        scanner = scanner.strict();
    }
    let catalog = scanner.initialize(descriptors)?;

    let compiler = SchemaCompiler::new(&catalog);
    compiler.validate()?;
    for (_, desc) in catalog.iter(Category::EntityType) {
        if let Some(fqn) = catalog.entity_type_fqn(desc) {
            compiler.resolve_entity_type(&fqn)?;
        }
    }

    info!(
        "Schema validated: {} entity types in container {}",
        catalog.len(Category::EntityType),
        catalog.container_fqn()
    );
    Ok(catalog)
}
