//! Protocol-level schema document types.
//!
//! These are the values handed to the external serializer for metadata
//! requests. Field names serialize in CSDL's PascalCase.

use serde::Serialize;

use crate::model::FullQualifiedName;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlSchema {
    pub namespace: String,
    pub entity_types: Vec<CsdlEntityType>,
    pub complex_types: Vec<CsdlComplexType>,
    pub enum_types: Vec<CsdlEnumType>,
    pub actions: Vec<CsdlAction>,
    pub functions: Vec<CsdlFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_container: Option<CsdlEntityContainer>,
}

impl CsdlSchema {
    pub fn entity_type(&self, name: &str) -> Option<&CsdlEntityType> {
        self.entity_types.iter().find(|t| t.name == name)
    }
}

// =============================================================================
// Structured types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlPropertyRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlProperty {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
    pub collection: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlNavigationProperty {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntityType {
    pub name: String,
    pub key: Vec<CsdlPropertyRef>,
    pub properties: Vec<CsdlProperty>,
    pub navigation_properties: Vec<CsdlNavigationProperty>,
}

impl CsdlEntityType {
    pub fn property(&self, name: &str) -> Option<&CsdlProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_property(&self, name: &str) -> Option<&CsdlNavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlComplexType {
    pub name: String,
    pub open_type: bool,
    pub properties: Vec<CsdlProperty>,
    pub navigation_properties: Vec<CsdlNavigationProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEnumMember {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEnumType {
    pub name: String,
    pub underlying_type: String,
    pub is_flags: bool,
    pub members: Vec<CsdlEnumMember>,
}

// =============================================================================
// Operations
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlParameter {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
    pub collection: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlReturnType {
    #[serde(rename = "Type")]
    pub type_name: String,
    pub collection: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlAction {
    pub name: String,
    pub is_bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set_path: Option<String>,
    pub parameters: Vec<CsdlParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<CsdlReturnType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlFunction {
    pub name: String,
    pub is_bound: bool,
    pub is_composable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set_path: Option<String>,
    pub parameters: Vec<CsdlParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<CsdlReturnType>,
}

// =============================================================================
// Container
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlNavigationPropertyBinding {
    pub path: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntitySet {
    pub name: String,
    #[serde(rename = "EntityType")]
    pub type_name: FullQualifiedName,
    pub include_in_service_document: bool,
    pub navigation_property_bindings: Vec<CsdlNavigationPropertyBinding>,
}

impl CsdlEntitySet {
    /// Target entity set bound to a navigation path.
    pub fn binding_target(&self, path: &str) -> Option<&str> {
        self.navigation_property_bindings
            .iter()
            .find(|b| b.path == path)
            .map(|b| b.target.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlActionImport {
    pub name: String,
    pub action: FullQualifiedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlFunctionImport {
    pub name: String,
    pub function: FullQualifiedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntityContainer {
    pub name: String,
    pub entity_sets: Vec<CsdlEntitySet>,
    pub action_imports: Vec<CsdlActionImport>,
    pub function_imports: Vec<CsdlFunctionImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntityContainerInfo {
    pub container_name: FullQualifiedName,
}

/// Top-level entries advertised by the service document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDocument {
    pub entity_sets: Vec<String>,
    pub function_imports: Vec<String>,
}
