//! Declarative tags attached to domain types and their fields.
//!
//! A tag mirrors one piece of protocol metadata: "this type is an entity
//! type with keys `Id`", "this field is a navigation to `Course`". Names
//! left unset (or blank) fall back to the host type or field name when the
//! catalog registers them.

use super::types::PrimitiveKind;

// =============================================================================
// Type-level tags
// =============================================================================

/// How a structured type maps onto the backing persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceMapping {
    /// Backend entity name; defaults to the host type name.
    pub entity: Option<String>,
    /// Root path variable; defaults to the host type name with a lowercase first letter.
    pub variable: Option<String>,
    /// Field through which this type's own fields are reached in the backend.
    pub super_entity: Option<String>,
}

/// Marks a type as a keyed entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct EntityTypeTag {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub keys: Vec<String>,
    pub persistence: PersistenceMapping,
}

impl EntityTypeTag {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            name: None,
            namespace: None,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            persistence: PersistenceMapping::default(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn persisted_as(mut self, entity: &str) -> Self {
        self.persistence.entity = Some(entity.into());
        self
    }

    pub fn with_variable(mut self, variable: &str) -> Self {
        self.persistence.variable = Some(variable.into());
        self
    }

    pub fn with_super_entity(mut self, super_entity: &str) -> Self {
        self.persistence.super_entity = Some(super_entity.into());
        self
    }
}

/// Exposes an entity type through an addressable entity set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySetTag {
    pub name: Option<String>,
    pub include_in_service_document: bool,
}

impl EntitySetTag {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            include_in_service_document: true,
        }
    }
}

/// Marks a type as a keyless complex type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct ComplexTypeTag {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub open_type: bool,
    pub persistence: PersistenceMapping,
}

impl ComplexTypeTag {
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn open(mut self) -> Self {
        self.open_type = true;
        self
    }

    pub fn persisted_as(mut self, entity: &str) -> Self {
        self.persistence.entity = Some(entity.into());
        self
    }

    pub fn with_super_entity(mut self, super_entity: &str) -> Self {
        self.persistence.super_entity = Some(super_entity.into());
        self
    }
}

/// One declared enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub ordinal: i64,
}

/// Marks a type as an enumeration. Members keep declaration order and take
/// their position as ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct EnumTypeTag {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub underlying: PrimitiveKind,
    pub is_flags: bool,
    pub members: Vec<EnumMember>,
}

impl EnumTypeTag {
    pub fn new(members: &[&str]) -> Self {
        Self {
            name: None,
            namespace: None,
            underlying: PrimitiveKind::Int32,
            is_flags: false,
            members: members
                .iter()
                .enumerate()
                .map(|(ordinal, name)| EnumMember {
                    name: name.to_string(),
                    ordinal: ordinal as i64,
                })
                .collect(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_underlying(mut self, underlying: PrimitiveKind) -> Self {
        self.underlying = underlying;
        self
    }

    pub fn flags(mut self) -> Self {
        self.is_flags = true;
        self
    }

    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_by_ordinal(&self, ordinal: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.ordinal == ordinal)
    }
}

/// Return type of an action or function.
///
/// `type_name` is a qualified name or `Edm.*` primitive, optionally wrapped
/// as `Collection(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTypeTag {
    pub type_name: String,
    pub nullable: bool,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub srid: Option<String>,
}

impl ReturnTypeTag {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.into(),
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
            srid: None,
        }
    }
}

/// Marks a type as an action or a function. The type's parameter-tagged
/// fields become the operation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct OperationTag {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub bound: bool,
    pub entity_set_path: Option<String>,
    pub composable: bool,
    pub return_type: Option<ReturnTypeTag>,
}

impl OperationTag {
    pub fn new() -> Self {
        Self {
            name: None,
            namespace: None,
            bound: false,
            entity_set_path: None,
            composable: false,
            return_type: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Bind to an entity set; the binding parameter takes the set name.
    pub fn bound_to(mut self, entity_set_path: &str) -> Self {
        self.bound = true;
        self.entity_set_path = Some(entity_set_path.into());
        self
    }

    pub fn composable(mut self) -> Self {
        self.composable = true;
        self
    }

    pub fn returns(mut self, return_type: ReturnTypeTag) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

impl Default for OperationTag {
    fn default() -> Self {
        Self::new()
    }
}

/// Exposes an unbound action or function at container level.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct ImportTag {
    pub name: Option<String>,
    pub namespace: Option<String>,
    /// Name of the imported action/function.
    pub operation: String,
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
}

impl ImportTag {
    pub fn new(operation: &str) -> Self {
        Self {
            name: None,
            namespace: None,
            operation: operation.into(),
            entity_set: None,
            include_in_service_document: false,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn returning_set(mut self, entity_set: &str) -> Self {
        self.entity_set = Some(entity_set.into());
        self
    }

    pub fn in_service_document(mut self) -> Self {
        self.include_in_service_document = true;
        self
    }
}

// =============================================================================
// Field-level tags
// =============================================================================

/// Structural property facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTag {
    pub name: Option<String>,
    /// Explicit protocol type, overriding inference.
    pub type_override: Option<String>,
    pub nullable: bool,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub srid: Option<String>,
    pub unicode: Option<bool>,
    pub default_value: Option<String>,
    /// Backend field name, when it differs from the host field.
    pub persistence_name: Option<String>,
    /// Backend entity reached through this field (complex fields only).
    pub persistence_entity: Option<String>,
}

impl Default for PropertyTag {
    fn default() -> Self {
        Self {
            name: None,
            type_override: None,
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
            srid: None,
            unicode: None,
            default_value: None,
            persistence_name: None,
            persistence_entity: None,
        }
    }
}

/// Navigation facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTag {
    pub name: Option<String>,
    /// Registered type name of the target, overriding the field's declared type.
    pub target_override: Option<String>,
    pub nullable: bool,
    pub partner: Option<String>,
    pub persistence_name: Option<String>,
    pub persistence_entity: Option<String>,
}

impl Default for NavigationTag {
    fn default() -> Self {
        Self {
            name: None,
            target_override: None,
            nullable: true,
            partner: None,
            persistence_name: None,
            persistence_entity: None,
        }
    }
}

/// Operation parameter facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTag {
    pub name: Option<String>,
    pub type_override: Option<String>,
    pub nullable: bool,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl Default for ParameterTag {
    fn default() -> Self {
        Self {
            name: None,
            type_override: None,
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
        }
    }
}

/// The tag carried by a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
    Property(PropertyTag),
    Navigation(NavigationTag),
    Parameter(ParameterTag),
    Untagged,
}
