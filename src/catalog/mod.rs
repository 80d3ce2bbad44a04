//! Metadata catalog.
//!
//! Indexes the candidate type descriptors into one name table per category.
//! Every other component resolves types through the catalog.
//!
//! ```text
//! [TypeDescriptor]  ──initialize──▶  Catalog (arena + name tables)
//!                                       │
//!                                       ▼ publish
//!                                  CatalogHandle ──snapshot──▶ Arc<Catalog> per request
//! ```
//!
//! A built catalog is immutable. Re-initialization builds a complete new
//! catalog and swaps it in through [`CatalogHandle::publish`].

mod error;

pub use error::{ScanError, ScanResult};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::model::{EnumTypeTag, FullQualifiedName, TypeDescriptor};

// =============================================================================
// Configuration
// =============================================================================

/// Values the catalog carries alongside the type tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub namespace: String,
    pub container_name: String,
    pub service_root: String,
    /// Page size ceiling.
    pub max_page_size: usize,
    /// Scope the candidate types were discovered under.
    pub root_package: Option<String>,
}

impl CatalogConfig {
    pub fn new(namespace: &str, container_name: &str) -> Self {
        Self {
            namespace: namespace.into(),
            container_name: container_name.into(),
            service_root: String::new(),
            max_page_size: 100,
            root_package: None,
        }
    }

    pub fn with_service_root(mut self, service_root: &str) -> Self {
        self.service_root = service_root.into();
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_root_package(mut self, root_package: Option<&str>) -> Self {
        self.root_package = root_package.map(str::to_string);
        self
    }
}

/// Registration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    EntitySet,
    EntityType,
    ComplexType,
    EnumType,
    Action,
    ActionImport,
    Function,
    FunctionImport,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::EntitySet => "entity set",
            Category::EntityType => "entity type",
            Category::ComplexType => "complex type",
            Category::EnumType => "enum type",
            Category::Action => "action",
            Category::ActionImport => "action import",
            Category::Function => "function",
            Category::FunctionImport => "function import",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Catalog
// =============================================================================

type NameTable = IndexMap<String, usize>;

/// Immutable, name-indexed view over the registered descriptors.
#[derive(Debug, Clone)]
pub struct Catalog {
    descriptors: Vec<TypeDescriptor>,
    by_type: HashMap<String, usize>,
    entity_sets: NameTable,
    entity_types: NameTable,
    complex_types: NameTable,
    enum_types: NameTable,
    actions: NameTable,
    action_imports: NameTable,
    functions: NameTable,
    function_imports: NameTable,
    config: CatalogConfig,
}

impl Catalog {
    fn empty(config: CatalogConfig) -> Self {
        Self {
            descriptors: Vec::new(),
            by_type: HashMap::new(),
            entity_sets: NameTable::new(),
            entity_types: NameTable::new(),
            complex_types: NameTable::new(),
            enum_types: NameTable::new(),
            actions: NameTable::new(),
            action_imports: NameTable::new(),
            functions: NameTable::new(),
            function_imports: NameTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn container_name(&self) -> &str {
        &self.config.container_name
    }

    pub fn service_root(&self) -> &str {
        &self.config.service_root
    }

    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }

    pub fn root_package(&self) -> Option<&str> {
        self.config.root_package.as_deref()
    }

    /// FQN of the single entity container.
    pub fn container_fqn(&self) -> FullQualifiedName {
        FullQualifiedName::new(&self.config.namespace, &self.config.container_name)
    }

    fn table(&self, category: Category) -> &NameTable {
        match category {
            Category::EntitySet => &self.entity_sets,
            Category::EntityType => &self.entity_types,
            Category::ComplexType => &self.complex_types,
            Category::EnumType => &self.enum_types,
            Category::Action => &self.actions,
            Category::ActionImport => &self.action_imports,
            Category::Function => &self.functions,
            Category::FunctionImport => &self.function_imports,
        }
    }

    fn table_mut(&mut self, category: Category) -> &mut NameTable {
        match category {
            Category::EntitySet => &mut self.entity_sets,
            Category::EntityType => &mut self.entity_types,
            Category::ComplexType => &mut self.complex_types,
            Category::EnumType => &mut self.enum_types,
            Category::Action => &mut self.actions,
            Category::ActionImport => &mut self.action_imports,
            Category::Function => &mut self.functions,
            Category::FunctionImport => &mut self.function_imports,
        }
    }

    /// Look up a registration by category and name.
    pub fn lookup(&self, category: Category, name: &str) -> Option<&TypeDescriptor> {
        self.table(category)
            .get(name)
            .map(|&idx| &self.descriptors[idx])
    }

    /// Iterate a category in registration order.
    pub fn iter(&self, category: Category) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.table(category)
            .iter()
            .map(|(name, &idx)| (name.as_str(), &self.descriptors[idx]))
    }

    /// Number of registrations in a category.
    pub fn len(&self, category: Category) -> usize {
        self.table(category).len()
    }

    /// Descriptor by host type name.
    pub fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.by_type.get(type_name).map(|&idx| &self.descriptors[idx])
    }

    pub fn entity_set(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::EntitySet, name)
    }

    pub fn entity_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::EntityType, name)
    }

    pub fn complex_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::ComplexType, name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::EnumType, name)
    }

    pub fn action(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::Action, name)
    }

    pub fn function(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::Function, name)
    }

    pub fn action_import(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::ActionImport, name)
    }

    pub fn function_import(&self, name: &str) -> Option<&TypeDescriptor> {
        self.lookup(Category::FunctionImport, name)
    }

    /// Enum tag of a registered enum host type.
    pub fn enum_tag(&self, type_name: &str) -> Option<&EnumTypeTag> {
        self.descriptor(type_name)?.enum_type.as_ref()
    }

    /// Registered entity set exposing the given host type.
    pub fn entity_set_of(&self, type_name: &str) -> Option<&str> {
        self.descriptor(type_name)?.entity_set_name()
    }

    // -------------------------------------------------------------------------
    // Qualified names
    // -------------------------------------------------------------------------

    fn qualify(&self, namespace: Option<&str>, name: &str) -> FullQualifiedName {
        let namespace = namespace
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&self.config.namespace);
        FullQualifiedName::new(namespace, name)
    }

    pub fn entity_type_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        let tag = desc.entity_type.as_ref()?;
        Some(self.qualify(tag.namespace.as_deref(), desc.entity_type_name()?))
    }

    pub fn complex_type_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        let tag = desc.complex_type.as_ref()?;
        Some(self.qualify(tag.namespace.as_deref(), desc.complex_type_name()?))
    }

    pub fn enum_type_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        let tag = desc.enum_type.as_ref()?;
        Some(self.qualify(tag.namespace.as_deref(), desc.enum_type_name()?))
    }

    pub fn action_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        let tag = desc.action.as_ref()?;
        Some(self.qualify(tag.namespace.as_deref(), desc.action_name()?))
    }

    pub fn function_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        let tag = desc.function.as_ref()?;
        Some(self.qualify(tag.namespace.as_deref(), desc.function_name()?))
    }

    /// FQN of an entity or complex type, whichever the descriptor carries.
    pub fn structured_fqn(&self, desc: &TypeDescriptor) -> Option<FullQualifiedName> {
        self.entity_type_fqn(desc)
            .or_else(|| self.complex_type_fqn(desc))
    }
}

// =============================================================================
// Initialization
// =============================================================================

/// Builds a [`Catalog`] from candidate descriptors.
#[derive(Debug, Clone)]
pub struct MetadataCatalog {
    config: CatalogConfig,
    strict: bool,
}

impl MetadataCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            strict: false,
        }
    }

    /// Reject same-category name collisions instead of overwriting.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Register every candidate under each tag it carries.
    ///
    /// A candidate is registered under the tag's explicit name, or its own
    /// type name when the tag leaves the name blank. By default a later
    /// registration replaces an earlier one with the same name in the same
    /// category; the replacement is logged.
    pub fn initialize(&self, candidates: Vec<TypeDescriptor>) -> ScanResult<Catalog> {
        let mut catalog = Catalog::empty(self.config.clone());

        for desc in candidates {
            if desc.type_name.trim().is_empty() {
                return Err(ScanError::EmptyTypeName);
            }
            if !desc.is_tagged() {
                return Err(ScanError::Untagged(desc.type_name));
            }

            let registrations: Vec<(Category, String)> = [
                (Category::EntitySet, desc.entity_set_name()),
                (Category::EntityType, desc.entity_type_name()),
                (Category::ComplexType, desc.complex_type_name()),
                (Category::EnumType, desc.enum_type_name()),
                (Category::Action, desc.action_name()),
                (Category::ActionImport, desc.action_import_name()),
                (Category::Function, desc.function_name()),
                (Category::FunctionImport, desc.function_import_name()),
            ]
            .into_iter()
            .filter_map(|(category, name)| name.map(|n| (category, n.to_string())))
            .collect();

            let idx = catalog.descriptors.len();
            for (category, name) in registrations {
                self.register(&mut catalog, category, name, idx, &desc.type_name)?;
            }

            if let Some(previous) = catalog.by_type.insert(desc.type_name.clone(), idx) {
                warn!(
                    "Type {} registered twice, replacing entry {}",
                    desc.type_name, previous
                );
            }
            catalog.descriptors.push(desc);
        }

        info!(
            "Catalog initialized: {} entity sets, {} entity types, {} complex types, {} enums",
            catalog.entity_sets.len(),
            catalog.entity_types.len(),
            catalog.complex_types.len(),
            catalog.enum_types.len()
        );
        Ok(catalog)
    }

    fn register(
        &self,
        catalog: &mut Catalog,
        category: Category,
        name: String,
        idx: usize,
        type_name: &str,
    ) -> ScanResult<()> {
        if let Some(&existing) = catalog.table(category).get(&name) {
            let existing_type = catalog.descriptors[existing].type_name.clone();
            if self.strict {
                return Err(ScanError::Conflict {
                    category,
                    name,
                    existing: existing_type,
                    incoming: type_name.to_string(),
                });
            }
            warn!(
                "{} {} from {} replaces the one from {}",
                category, name, type_name, existing_type
            );
        }
        debug!("{} {} is loaded from {}", category, name, type_name);
        catalog.table_mut(category).insert(name, idx);
        Ok(())
    }
}

// =============================================================================
// Publication
// =============================================================================

/// Shared slot holding the current catalog.
///
/// Readers take an `Arc` snapshot without locking and keep it for the whole
/// request; a concurrent [`publish`](Self::publish) never affects a snapshot
/// already taken.
#[derive(Debug)]
pub struct CatalogHandle {
    current: ArcSwap<Catalog>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Replace the current catalog with a fully built one.
    pub fn publish(&self, catalog: Catalog) {
        self.current.store(Arc::new(catalog));
        info!("Published new catalog");
    }
}
