//! Field and type descriptors.
//!
//! A [`TypeDescriptor`] is the explicit, registration-time description of a
//! domain type: which tags it carries and which fields it exposes. Domain
//! types publish one through [`Describe`]; nothing is discovered by
//! inspecting values at runtime.
//!
//! # Example
//!
//! ```ignore
//! let student = TypeDescriptor::entity("Student", &["Id"])
//!     .entity_set("Students")
//!     .field(FieldDescriptor::property("id", int64()).named("Id").not_null())
//!     .field(FieldDescriptor::property("name", string()).named("Name"))
//!     .field(FieldDescriptor::navigation("courses", ValueType::collection(ValueType::entity("Course"))));
//! ```

use super::naming::explicit;
use super::tags::*;
use super::types::ValueType;

// =============================================================================
// Field Descriptor
// =============================================================================

/// One field of a domain type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct FieldDescriptor {
    /// Host field name; also the key used in records.
    pub name: String,
    pub value_type: ValueType,
    /// Registered name of the supertype declaring this field, if inherited.
    pub declared_on: Option<String>,
    pub tag: FieldTag,
}

impl FieldDescriptor {
    pub fn property(name: &str, value_type: ValueType) -> Self {
        Self::with_tag(name, value_type, FieldTag::Property(PropertyTag::default()))
    }

    pub fn navigation(name: &str, value_type: ValueType) -> Self {
        Self::with_tag(
            name,
            value_type,
            FieldTag::Navigation(NavigationTag::default()),
        )
    }

    pub fn parameter(name: &str, value_type: ValueType) -> Self {
        Self::with_tag(name, value_type, FieldTag::Parameter(ParameterTag::default()))
    }

    pub fn untagged(name: &str, value_type: ValueType) -> Self {
        Self::with_tag(name, value_type, FieldTag::Untagged)
    }

    fn with_tag(name: &str, value_type: ValueType, tag: FieldTag) -> Self {
        Self {
            name: name.into(),
            value_type,
            declared_on: None,
            tag,
        }
    }

    /// Set the protocol name.
    pub fn named(mut self, name: &str) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.name = Some(name.into()),
            FieldTag::Navigation(tag) => tag.name = Some(name.into()),
            FieldTag::Parameter(tag) => tag.name = Some(name.into()),
            FieldTag::Untagged => {}
        }
        self
    }

    pub fn not_null(mut self) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.nullable = false,
            FieldTag::Navigation(tag) => tag.nullable = false,
            FieldTag::Parameter(tag) => tag.nullable = false,
            FieldTag::Untagged => {}
        }
        self
    }

    pub fn declared_on(mut self, supertype: &str) -> Self {
        self.declared_on = Some(supertype.into());
        self
    }

    /// Override the inferred protocol type (properties and parameters).
    pub fn with_type(mut self, type_name: &str) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.type_override = Some(type_name.into()),
            FieldTag::Parameter(tag) => tag.type_override = Some(type_name.into()),
            _ => {}
        }
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.max_length = Some(max_length),
            FieldTag::Parameter(tag) => tag.max_length = Some(max_length),
            _ => {}
        }
        self
    }

    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => {
                tag.precision = Some(precision);
                tag.scale = Some(scale);
            }
            FieldTag::Parameter(tag) => {
                tag.precision = Some(precision);
                tag.scale = Some(scale);
            }
            _ => {}
        }
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        if let FieldTag::Property(tag) = &mut self.tag {
            tag.default_value = Some(value.into());
        }
        self
    }

    pub fn unicode(mut self, unicode: bool) -> Self {
        if let FieldTag::Property(tag) = &mut self.tag {
            tag.unicode = Some(unicode);
        }
        self
    }

    pub fn srid(mut self, srid: &str) -> Self {
        if let FieldTag::Property(tag) = &mut self.tag {
            tag.srid = Some(srid.into());
        }
        self
    }

    /// Partner navigation on the target type.
    pub fn partner(mut self, partner: &str) -> Self {
        if let FieldTag::Navigation(tag) = &mut self.tag {
            tag.partner = Some(partner.into());
        }
        self
    }

    /// Navigation target override.
    pub fn targets(mut self, type_name: &str) -> Self {
        if let FieldTag::Navigation(tag) = &mut self.tag {
            tag.target_override = Some(type_name.into());
        }
        self
    }

    /// Backend field name.
    pub fn persisted_as(mut self, name: &str) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.persistence_name = Some(name.into()),
            FieldTag::Navigation(tag) => tag.persistence_name = Some(name.into()),
            _ => {}
        }
        self
    }

    /// Backend entity reached through this field.
    pub fn persisted_in(mut self, entity: &str) -> Self {
        match &mut self.tag {
            FieldTag::Property(tag) => tag.persistence_entity = Some(entity.into()),
            FieldTag::Navigation(tag) => tag.persistence_entity = Some(entity.into()),
            _ => {}
        }
        self
    }

    /// The protocol-facing name: the tag's explicit name, else the field name.
    pub fn edm_name(&self) -> &str {
        let explicit_name = match &self.tag {
            FieldTag::Property(tag) => explicit(&tag.name),
            FieldTag::Navigation(tag) => explicit(&tag.name),
            FieldTag::Parameter(tag) => explicit(&tag.name),
            FieldTag::Untagged => None,
        };
        explicit_name.unwrap_or(&self.name)
    }

    /// The backend field name: the persistence override, else the field name.
    pub fn persistence_name(&self) -> &str {
        let override_name = match &self.tag {
            FieldTag::Property(tag) => explicit(&tag.persistence_name),
            FieldTag::Navigation(tag) => explicit(&tag.persistence_name),
            _ => None,
        };
        override_name.unwrap_or(&self.name)
    }

    pub fn persistence_entity(&self) -> Option<&str> {
        match &self.tag {
            FieldTag::Property(tag) => explicit(&tag.persistence_entity),
            FieldTag::Navigation(tag) => explicit(&tag.persistence_entity),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyTag> {
        match &self.tag {
            FieldTag::Property(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_navigation(&self) -> Option<&NavigationTag> {
        match &self.tag {
            FieldTag::Navigation(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterTag> {
        match &self.tag {
            FieldTag::Parameter(tag) => Some(tag),
            _ => None,
        }
    }

    /// Registered type name of a navigation target.
    pub fn navigation_target(&self) -> Option<&str> {
        let tag = self.as_navigation()?;
        explicit(&tag.target_override).or_else(|| self.value_type.target_name())
    }

    /// Match by protocol name or host field name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.edm_name() == name || self.name == name
    }
}

// =============================================================================
// Type Descriptor
// =============================================================================

/// The complete registration-time description of one domain type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct TypeDescriptor {
    /// Stable host type name (the "simple name").
    pub type_name: String,
    pub entity_type: Option<EntityTypeTag>,
    pub entity_set: Option<EntitySetTag>,
    pub complex_type: Option<ComplexTypeTag>,
    pub enum_type: Option<EnumTypeTag>,
    pub action: Option<OperationTag>,
    pub action_import: Option<ImportTag>,
    pub function: Option<OperationTag>,
    pub function_import: Option<ImportTag>,
    /// Fields in declaration order, inherited fields included.
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.into(),
            entity_type: None,
            entity_set: None,
            complex_type: None,
            enum_type: None,
            action: None,
            action_import: None,
            function: None,
            function_import: None,
            fields: Vec::new(),
        }
    }

    /// An entity type keyed by the given property names.
    pub fn entity(type_name: &str, keys: &[&str]) -> Self {
        Self::new(type_name).with_entity_type(EntityTypeTag::new(keys))
    }

    pub fn complex(type_name: &str) -> Self {
        Self::new(type_name).with_complex_type(ComplexTypeTag::default())
    }

    pub fn enumeration(type_name: &str, members: &[&str]) -> Self {
        Self::new(type_name).with_enum_type(EnumTypeTag::new(members))
    }

    pub fn with_entity_type(mut self, tag: EntityTypeTag) -> Self {
        self.entity_type = Some(tag);
        self
    }

    pub fn entity_set(self, name: &str) -> Self {
        self.with_entity_set(EntitySetTag::new(name))
    }

    pub fn with_entity_set(mut self, tag: EntitySetTag) -> Self {
        self.entity_set = Some(tag);
        self
    }

    pub fn with_complex_type(mut self, tag: ComplexTypeTag) -> Self {
        self.complex_type = Some(tag);
        self
    }

    pub fn with_enum_type(mut self, tag: EnumTypeTag) -> Self {
        self.enum_type = Some(tag);
        self
    }

    pub fn with_action(mut self, tag: OperationTag) -> Self {
        self.action = Some(tag);
        self
    }

    pub fn with_action_import(mut self, tag: ImportTag) -> Self {
        self.action_import = Some(tag);
        self
    }

    pub fn with_function(mut self, tag: OperationTag) -> Self {
        self.function = Some(tag);
        self
    }

    pub fn with_function_import(mut self, tag: ImportTag) -> Self {
        self.function_import = Some(tag);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Copy every field of `supertype`, marking each as declared there.
    pub fn inherit(mut self, supertype: &TypeDescriptor) -> Self {
        let inherited = supertype.fields.iter().map(|f| {
            let mut f = f.clone();
            if f.declared_on.is_none() {
                f.declared_on = Some(supertype.type_name.clone());
            }
            f
        });
        let mut fields: Vec<FieldDescriptor> = inherited.collect();
        fields.append(&mut self.fields);
        self.fields = fields;
        self
    }

    /// Whether any recognized tag is present.
    pub fn is_tagged(&self) -> bool {
        self.entity_type.is_some()
            || self.entity_set.is_some()
            || self.complex_type.is_some()
            || self.enum_type.is_some()
            || self.action.is_some()
            || self.action_import.is_some()
            || self.function.is_some()
            || self.function_import.is_some()
    }

    pub fn entity_type_name(&self) -> Option<&str> {
        let tag = self.entity_type.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn entity_set_name(&self) -> Option<&str> {
        let tag = self.entity_set.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn complex_type_name(&self) -> Option<&str> {
        let tag = self.complex_type.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn enum_type_name(&self) -> Option<&str> {
        let tag = self.enum_type.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn action_name(&self) -> Option<&str> {
        let tag = self.action.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn function_name(&self) -> Option<&str> {
        let tag = self.function.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn action_import_name(&self) -> Option<&str> {
        let tag = self.action_import.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    pub fn function_import_name(&self) -> Option<&str> {
        let tag = self.function_import.as_ref()?;
        Some(explicit(&tag.name).unwrap_or(&self.type_name))
    }

    /// Persistence mapping of an entity or complex type.
    pub fn persistence(&self) -> Option<&PersistenceMapping> {
        self.entity_type
            .as_ref()
            .map(|t| &t.persistence)
            .or_else(|| self.complex_type.as_ref().map(|t| &t.persistence))
    }

    /// Backend entity name.
    pub fn persistence_entity(&self) -> &str {
        self.persistence()
            .and_then(|p| explicit(&p.entity))
            .unwrap_or(&self.type_name)
    }

    pub fn super_entity(&self) -> Option<&str> {
        self.persistence().and_then(|p| explicit(&p.super_entity))
    }

    /// Root path variable: explicit, else the type name with a lowercase first letter.
    pub fn path_variable(&self) -> String {
        if let Some(variable) = self.persistence().and_then(|p| explicit(&p.variable)) {
            return variable.to_string();
        }
        let mut chars = self.type_name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Find a field by protocol name or host field name.
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.answers_to(name))
    }

    pub fn properties(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.as_property().is_some())
    }

    pub fn navigations(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.as_navigation().is_some())
    }

    pub fn parameters(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.as_parameter().is_some())
    }
}

/// Implemented by domain types to publish their descriptor.
pub trait Describe {
    fn descriptor() -> TypeDescriptor;
}

/// Collect the descriptor of `T`.
pub fn describe<T: Describe>() -> TypeDescriptor {
    T::descriptor()
}
