//! Schema compiler: renders catalog descriptors as CSDL.
//!
//! Every `resolve_*` lookup distinguishes "not registered" (`Ok(None)` or an
//! empty list) from a structurally broken registration (`Err`).

use tracing::debug;

use super::csdl::*;
use super::error::{SchemaError, SchemaResult};
use crate::catalog::{Catalog, Category};
use crate::model::naming::explicit;
use crate::model::{
    strip_collection, FieldDescriptor, FullQualifiedName, OperationTag, ReturnTypeTag,
    TypeDescriptor, ValueType,
};

/// Resolves qualified names against a catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'a> {
    catalog: &'a Catalog,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    // =========================================================================
    // Structured types
    // =========================================================================

    /// Resolve an entity type.
    ///
    /// Fails when the type declares no key or a key that is not one of its
    /// properties.
    pub fn resolve_entity_type(
        &self,
        fqn: &FullQualifiedName,
    ) -> SchemaResult<Option<CsdlEntityType>> {
        let Some(desc) = self.catalog.entity_type(&fqn.name) else {
            return Ok(None);
        };
        if self.catalog.entity_type_fqn(desc).as_ref() != Some(fqn) {
            return Ok(None);
        }
        self.compile_entity_type(desc).map(Some)
    }

    pub fn resolve_complex_type(
        &self,
        fqn: &FullQualifiedName,
    ) -> SchemaResult<Option<CsdlComplexType>> {
        let Some(desc) = self.catalog.complex_type(&fqn.name) else {
            return Ok(None);
        };
        if self.catalog.complex_type_fqn(desc).as_ref() != Some(fqn) {
            return Ok(None);
        }
        self.compile_complex_type(desc).map(Some)
    }

    /// Resolve an enum type; members are emitted in ordinal order.
    pub fn resolve_enum_type(&self, fqn: &FullQualifiedName) -> Option<CsdlEnumType> {
        let desc = self.catalog.enum_type(&fqn.name)?;
        if self.catalog.enum_type_fqn(desc).as_ref() != Some(fqn) {
            return None;
        }
        self.compile_enum_type(desc)
    }

    fn compile_entity_type(&self, desc: &TypeDescriptor) -> SchemaResult<CsdlEntityType> {
        let name = desc.entity_type_name().unwrap_or(&desc.type_name).to_string();
        let keys = desc
            .entity_type
            .as_ref()
            .map(|tag| tag.keys.as_slice())
            .unwrap_or_default();
        if keys.is_empty() {
            return Err(SchemaError::EmptyKey { entity: name });
        }

        let (properties, navigation_properties) = self.structural_members(desc)?;

        let mut key = Vec::with_capacity(keys.len());
        for k in keys {
            if !properties.iter().any(|p| &p.name == k) {
                return Err(SchemaError::MissingKeyProperty {
                    entity: name,
                    key: k.clone(),
                });
            }
            key.push(CsdlPropertyRef { name: k.clone() });
        }

        debug!(
            "Entity type {} compiled with {} properties",
            name,
            properties.len()
        );
        Ok(CsdlEntityType {
            name,
            key,
            properties,
            navigation_properties,
        })
    }

    fn compile_complex_type(&self, desc: &TypeDescriptor) -> SchemaResult<CsdlComplexType> {
        let (properties, navigation_properties) = self.structural_members(desc)?;
        Ok(CsdlComplexType {
            name: desc
                .complex_type_name()
                .unwrap_or(&desc.type_name)
                .to_string(),
            open_type: desc.complex_type.as_ref().is_some_and(|t| t.open_type),
            properties,
            navigation_properties,
        })
    }

    fn compile_enum_type(&self, desc: &TypeDescriptor) -> Option<CsdlEnumType> {
        let tag = desc.enum_type.as_ref()?;
        let mut members: Vec<CsdlEnumMember> = tag
            .members
            .iter()
            .map(|m| CsdlEnumMember {
                name: m.name.clone(),
                value: m.ordinal,
            })
            .collect();
        members.sort_by_key(|m| m.value);

        Some(CsdlEnumType {
            name: desc.enum_type_name()?.to_string(),
            underlying_type: tag.underlying.edm_name().to_string(),
            is_flags: tag.is_flags,
            members,
        })
    }

    fn structural_members(
        &self,
        desc: &TypeDescriptor,
    ) -> SchemaResult<(Vec<CsdlProperty>, Vec<CsdlNavigationProperty>)> {
        let mut properties = Vec::new();
        let mut navigations = Vec::new();
        for field in &desc.fields {
            if let Some(tag) = field.as_property() {
                let (type_name, collection) =
                    self.infer_type(&desc.type_name, field, tag.type_override.as_ref())?;
                properties.push(CsdlProperty {
                    name: field.edm_name().to_string(),
                    type_name,
                    collection,
                    nullable: tag.nullable,
                    max_length: tag.max_length,
                    precision: tag.precision,
                    scale: tag.scale,
                    srid: tag.srid.clone(),
                    unicode: tag.unicode,
                    default_value: tag.default_value.clone(),
                });
            } else if let Some(tag) = field.as_navigation() {
                let target = self.navigation_target(&desc.type_name, field)?;
                navigations.push(CsdlNavigationProperty {
                    name: field.edm_name().to_string(),
                    type_name: target,
                    collection: field.value_type.is_collection(),
                    nullable: tag.nullable,
                    partner: explicit(&tag.partner).map(str::to_string),
                });
            }
        }
        Ok((properties, navigations))
    }

    /// Protocol type of a property or parameter, plus its collection flag.
    fn infer_type(
        &self,
        owner: &str,
        field: &FieldDescriptor,
        type_override: Option<&String>,
    ) -> SchemaResult<(String, bool)> {
        let collection = field.value_type.is_collection();
        if let Some(explicit_type) = type_override.map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let (inner, wrapped) = strip_collection(explicit_type);
            return Ok((inner.to_string(), wrapped || collection));
        }

        let unknown = |type_name: &str| SchemaError::UnknownType {
            type_name: type_name.to_string(),
            referenced_by: format!("{}.{}", owner, field.name),
        };

        let type_name = match field.value_type.element() {
            ValueType::Primitive(kind) => kind.edm_name().to_string(),
            ValueType::Enum(name) => self
                .catalog
                .descriptor(name)
                .and_then(|d| self.catalog.enum_type_fqn(d))
                .ok_or_else(|| unknown(name))?
                .to_string(),
            ValueType::Complex(name) => self
                .catalog
                .descriptor(name)
                .and_then(|d| self.catalog.complex_type_fqn(d))
                .ok_or_else(|| unknown(name))?
                .to_string(),
            ValueType::Entity(_) | ValueType::Opaque(_) | ValueType::Collection(_) => {
                return Err(SchemaError::UnrecognizedType {
                    owner: owner.to_string(),
                    field: field.name.clone(),
                    value_type: field.value_type.to_string(),
                })
            }
        };
        Ok((type_name, collection))
    }

    fn navigation_target(
        &self,
        owner: &str,
        field: &FieldDescriptor,
    ) -> SchemaResult<FullQualifiedName> {
        let target = field
            .navigation_target()
            .ok_or_else(|| SchemaError::UnrecognizedType {
                owner: owner.to_string(),
                field: field.name.clone(),
                value_type: field.value_type.to_string(),
            })?;
        let desc = self
            .catalog
            .descriptor(target)
            .ok_or_else(|| SchemaError::UnknownType {
                type_name: target.to_string(),
                referenced_by: format!("{}.{}", owner, field.name),
            })?;
        self.catalog
            .entity_type_fqn(desc)
            .ok_or_else(|| SchemaError::InvalidNavigationTarget {
                owner: owner.to_string(),
                field: field.name.clone(),
                target: target.to_string(),
            })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// All actions registered under `fqn`.
    pub fn resolve_actions(&self, fqn: &FullQualifiedName) -> SchemaResult<Vec<CsdlAction>> {
        let Some(desc) = self.catalog.action(&fqn.name) else {
            return Ok(Vec::new());
        };
        if self.catalog.action_fqn(desc).as_ref() != Some(fqn) {
            return Ok(Vec::new());
        }
        Ok(vec![self.compile_action(desc)?])
    }

    /// All functions registered under `fqn`.
    pub fn resolve_functions(&self, fqn: &FullQualifiedName) -> SchemaResult<Vec<CsdlFunction>> {
        let Some(desc) = self.catalog.function(&fqn.name) else {
            return Ok(Vec::new());
        };
        if self.catalog.function_fqn(desc).as_ref() != Some(fqn) {
            return Ok(Vec::new());
        }
        Ok(vec![self.compile_function(desc)?])
    }

    fn compile_action(&self, desc: &TypeDescriptor) -> SchemaResult<CsdlAction> {
        let name = desc.action_name().unwrap_or(&desc.type_name).to_string();
        let default_tag = OperationTag::new();
        let tag = desc.action.as_ref().unwrap_or(&default_tag);
        Ok(CsdlAction {
            parameters: self.parameters(desc, tag, &name)?,
            is_bound: tag.bound,
            entity_set_path: explicit(&tag.entity_set_path).map(str::to_string),
            return_type: tag.return_type.as_ref().map(return_type),
            name,
        })
    }

    fn compile_function(&self, desc: &TypeDescriptor) -> SchemaResult<CsdlFunction> {
        let name = desc.function_name().unwrap_or(&desc.type_name).to_string();
        let default_tag = OperationTag::new();
        let tag = desc.function.as_ref().unwrap_or(&default_tag);
        Ok(CsdlFunction {
            parameters: self.parameters(desc, tag, &name)?,
            is_bound: tag.bound,
            is_composable: tag.composable,
            entity_set_path: explicit(&tag.entity_set_path).map(str::to_string),
            return_type: tag.return_type.as_ref().map(return_type),
            name,
        })
    }

    /// Parameters in declaration order, led by the binding parameter for
    /// bound operations.
    fn parameters(
        &self,
        desc: &TypeDescriptor,
        tag: &OperationTag,
        operation: &str,
    ) -> SchemaResult<Vec<CsdlParameter>> {
        let mut parameters = Vec::new();

        if tag.bound {
            let path = explicit(&tag.entity_set_path)
                .ok_or_else(|| SchemaError::MissingEntitySetPath(operation.to_string()))?;
            let set = self
                .catalog
                .entity_set(path)
                .ok_or_else(|| SchemaError::UnknownEntitySet {
                    name: path.to_string(),
                    referenced_by: operation.to_string(),
                })?;
            let binding_type = self
                .catalog
                .entity_type_fqn(set)
                .ok_or_else(|| SchemaError::MissingEntityType(path.to_string()))?;
            parameters.push(CsdlParameter {
                name: path.to_string(),
                type_name: binding_type.to_string(),
                collection: false,
                nullable: false,
                max_length: None,
                precision: None,
                scale: None,
            });
        }

        for field in desc.parameters() {
            let Some(param) = field.as_parameter() else {
                continue;
            };
            let (type_name, collection) =
                self.infer_type(&desc.type_name, field, param.type_override.as_ref())?;
            parameters.push(CsdlParameter {
                name: field.edm_name().to_string(),
                type_name,
                collection,
                nullable: param.nullable,
                max_length: param.max_length,
                precision: param.precision,
                scale: param.scale,
            });
        }
        Ok(parameters)
    }

    // =========================================================================
    // Container
    // =========================================================================

    /// Resolve an entity set of the given container.
    pub fn resolve_entity_set(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> SchemaResult<Option<CsdlEntitySet>> {
        if *container != self.catalog.container_fqn() {
            return Ok(None);
        }
        let Some(desc) = self.catalog.entity_set(name) else {
            return Ok(None);
        };
        self.compile_entity_set(name, desc).map(Some)
    }

    fn compile_entity_set(&self, name: &str, desc: &TypeDescriptor) -> SchemaResult<CsdlEntitySet> {
        let type_name = self
            .catalog
            .entity_type_fqn(desc)
            .ok_or_else(|| SchemaError::MissingEntityType(name.to_string()))?;

        // Navigations whose target has no entity set get no binding.
        let navigation_property_bindings = desc
            .navigations()
            .filter_map(|nav| {
                let target_set = self.catalog.entity_set_of(nav.navigation_target()?)?;
                Some(CsdlNavigationPropertyBinding {
                    path: nav.edm_name().to_string(),
                    target: target_set.to_string(),
                })
            })
            .collect();

        Ok(CsdlEntitySet {
            name: name.to_string(),
            type_name,
            include_in_service_document: desc
                .entity_set
                .as_ref()
                .map_or(true, |t| t.include_in_service_document),
            navigation_property_bindings,
        })
    }

    pub fn resolve_action_import(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> SchemaResult<Option<CsdlActionImport>> {
        if *container != self.catalog.container_fqn() {
            return Ok(None);
        }
        let Some(desc) = self.catalog.action_import(name) else {
            return Ok(None);
        };
        self.compile_action_import(name, desc).map(Some)
    }

    fn compile_action_import(
        &self,
        name: &str,
        desc: &TypeDescriptor,
    ) -> SchemaResult<CsdlActionImport> {
        let Some(tag) = desc.action_import.as_ref() else {
            return Err(SchemaError::UnknownOperation {
                import: name.to_string(),
                operation: desc.type_name.clone(),
            });
        };
        let action = self
            .catalog
            .action(&tag.operation)
            .and_then(|d| self.catalog.action_fqn(d))
            .ok_or_else(|| SchemaError::UnknownOperation {
                import: name.to_string(),
                operation: tag.operation.clone(),
            })?;
        Ok(CsdlActionImport {
            name: name.to_string(),
            action: self.import_target(tag.namespace.as_ref(), action),
            entity_set: self.import_entity_set(name, tag.entity_set.as_ref())?,
        })
    }

    pub fn resolve_function_import(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> SchemaResult<Option<CsdlFunctionImport>> {
        if *container != self.catalog.container_fqn() {
            return Ok(None);
        }
        let Some(desc) = self.catalog.function_import(name) else {
            return Ok(None);
        };
        self.compile_function_import(name, desc).map(Some)
    }

    fn compile_function_import(
        &self,
        name: &str,
        desc: &TypeDescriptor,
    ) -> SchemaResult<CsdlFunctionImport> {
        let Some(tag) = desc.function_import.as_ref() else {
            return Err(SchemaError::UnknownOperation {
                import: name.to_string(),
                operation: desc.type_name.clone(),
            });
        };
        let function = self
            .catalog
            .function(&tag.operation)
            .and_then(|d| self.catalog.function_fqn(d))
            .ok_or_else(|| SchemaError::UnknownOperation {
                import: name.to_string(),
                operation: tag.operation.clone(),
            })?;
        Ok(CsdlFunctionImport {
            name: name.to_string(),
            function: self.import_target(tag.namespace.as_ref(), function),
            entity_set: self.import_entity_set(name, tag.entity_set.as_ref())?,
            include_in_service_document: tag.include_in_service_document,
        })
    }

    /// An import's own namespace, when set, qualifies the imported operation.
    fn import_target(
        &self,
        namespace: Option<&String>,
        operation: FullQualifiedName,
    ) -> FullQualifiedName {
        match namespace.map(|ns| ns.trim()).filter(|ns| !ns.is_empty()) {
            Some(ns) => FullQualifiedName::new(ns, operation.name),
            None => operation,
        }
    }

    fn import_entity_set(
        &self,
        import: &str,
        entity_set: Option<&String>,
    ) -> SchemaResult<Option<String>> {
        let Some(set) = entity_set.map(|s| s.trim()).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if self.catalog.entity_set(set).is_none() {
            return Err(SchemaError::UnknownEntitySet {
                name: set.to_string(),
                referenced_by: import.to_string(),
            });
        }
        Ok(Some(set.to_string()))
    }

    /// The single entity container, entries in catalog order.
    pub fn resolve_entity_container(&self) -> SchemaResult<CsdlEntityContainer> {
        let entity_sets = self
            .catalog
            .iter(Category::EntitySet)
            .map(|(name, desc)| self.compile_entity_set(name, desc))
            .collect::<SchemaResult<Vec<_>>>()?;
        let action_imports = self
            .catalog
            .iter(Category::ActionImport)
            .map(|(name, desc)| self.compile_action_import(name, desc))
            .collect::<SchemaResult<Vec<_>>>()?;
        let function_imports = self
            .catalog
            .iter(Category::FunctionImport)
            .map(|(name, desc)| self.compile_function_import(name, desc))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(CsdlEntityContainer {
            name: self.catalog.container_name().to_string(),
            entity_sets,
            action_imports,
            function_imports,
        })
    }

    /// Container info for `container`, or for the default container when `None`.
    pub fn resolve_container_info(
        &self,
        container: Option<&FullQualifiedName>,
    ) -> Option<CsdlEntityContainerInfo> {
        let own = self.catalog.container_fqn();
        match container {
            None => Some(CsdlEntityContainerInfo { container_name: own }),
            Some(fqn) if *fqn == own => Some(CsdlEntityContainerInfo { container_name: own }),
            Some(_) => None,
        }
    }

    // =========================================================================
    // Document
    // =========================================================================

    /// The whole model as one schema, entity types sorted by name.
    pub fn resolve_schema_document(&self) -> SchemaResult<CsdlSchema> {
        let mut entity_types = self
            .catalog
            .iter(Category::EntityType)
            .map(|(_, desc)| self.compile_entity_type(desc))
            .collect::<SchemaResult<Vec<_>>>()?;
        entity_types.sort_by(|a, b| a.name.cmp(&b.name));

        let complex_types = self
            .catalog
            .iter(Category::ComplexType)
            .map(|(_, desc)| self.compile_complex_type(desc))
            .collect::<SchemaResult<Vec<_>>>()?;

        let enum_types = self
            .catalog
            .iter(Category::EnumType)
            .filter_map(|(_, desc)| self.compile_enum_type(desc))
            .collect();

        let actions = self
            .catalog
            .iter(Category::Action)
            .map(|(_, desc)| self.compile_action(desc))
            .collect::<SchemaResult<Vec<_>>>()?;

        let functions = self
            .catalog
            .iter(Category::Function)
            .map(|(_, desc)| self.compile_function(desc))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(CsdlSchema {
            namespace: self.catalog.namespace().to_string(),
            entity_types,
            complex_types,
            enum_types,
            actions,
            functions,
            entity_container: Some(self.resolve_entity_container()?),
        })
    }

    pub fn resolve_schemas(&self) -> SchemaResult<Vec<CsdlSchema>> {
        Ok(vec![self.resolve_schema_document()?])
    }

    /// Entity sets and advertised function imports.
    pub fn service_document(&self) -> ServiceDocument {
        ServiceDocument {
            entity_sets: self
                .catalog
                .iter(Category::EntitySet)
                .filter(|(_, desc)| {
                    desc.entity_set
                        .as_ref()
                        .map_or(true, |t| t.include_in_service_document)
                })
                .map(|(name, _)| name.to_string())
                .collect(),
            function_imports: self
                .catalog
                .iter(Category::FunctionImport)
                .filter(|(_, desc)| {
                    desc.function_import
                        .as_ref()
                        .is_some_and(|t| t.include_in_service_document)
                })
                .map(|(name, _)| name.to_string())
                .collect(),
        }
    }

    /// Check tag combinations and cross references of every registration.
    ///
    /// Key integrity is left to [`resolve_entity_type`](Self::resolve_entity_type).
    pub fn validate(&self) -> SchemaResult<()> {
        for (name, desc) in self.catalog.iter(Category::EntityType) {
            if desc.entity_set.is_none() {
                return Err(SchemaError::MissingEntitySet(name.to_string()));
            }
            self.structural_members(desc)?;
        }
        for (_, desc) in self.catalog.iter(Category::ComplexType) {
            self.structural_members(desc)?;
        }
        self.resolve_entity_container()?;
        for (_, desc) in self.catalog.iter(Category::Action) {
            self.compile_action(desc)?;
        }
        for (_, desc) in self.catalog.iter(Category::Function) {
            self.compile_function(desc)?;
        }
        Ok(())
    }
}

fn return_type(tag: &ReturnTypeTag) -> CsdlReturnType {
    let (type_name, collection) = strip_collection(tag.type_name.trim());
    CsdlReturnType {
        type_name: type_name.to_string(),
        collection,
        nullable: tag.nullable,
        max_length: tag.max_length,
        precision: tag.precision,
        scale: tag.scale,
        srid: tag.srid.clone(),
    }
}
