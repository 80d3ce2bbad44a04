//! Record ⇄ wire entity mapping.
//!
//! ```text
//! Record ──to_wire_entity──▶ WireEntity
//!   property fields   ──▶ WireProperty (primitive | enum ordinal | complex | collection)
//!   navigation fields ──▶ WireLink, only when named by $expand
//!   key values        ──▶ id "Students(Id=1)"
//! ```
//!
//! The wire shape of each field follows its declared [`ValueType`]; values
//! that disagree with the declaration fail with [`MarshalError::ValueMismatch`].

use chrono::{TimeZone, Utc};
use tracing::debug;

use super::error::{MarshalError, MarshalResult};
use super::record::{Record, Value};
use super::wire::*;
use crate::catalog::Catalog;
use crate::model::{
    collection_of, strip_collection, FieldDescriptor, FieldTag, PrimitiveKind, TypeDescriptor,
    ValueType,
};
use crate::query::ExpandOption;
use crate::schema::SchemaError;

/// Maps records of registered types to wire entities and back.
///
/// Holds nothing but a catalog reference; build one per request.
#[derive(Debug, Clone, Copy)]
pub struct EntityMarshaller<'a> {
    catalog: &'a Catalog,
}

impl<'a> EntityMarshaller<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    // =========================================================================
    // Record -> wire
    // =========================================================================

    /// Marshal a record, inlining the navigations named by `expand`.
    pub fn to_wire_entity(
        &self,
        record: &Record,
        expand: Option<&ExpandOption>,
    ) -> MarshalResult<WireEntity> {
        let desc = self.structured(record.type_name())?;
        let fqn = self
            .catalog
            .structured_fqn(desc)
            .ok_or_else(|| MarshalError::NotStructured(desc.type_name.clone()))?;

        let mut entity = WireEntity::new(&fqn.to_string());
        for field in &desc.fields {
            match &field.tag {
                FieldTag::Property(_) => {
                    let property = self.to_wire_property(desc, field, record)?;
                    debug!(
                        "Load property {} into entity {}",
                        property.name, entity.type_name
                    );
                    entity.properties.push(property);
                }
                FieldTag::Navigation(_) => {
                    if let Some(link) = self.to_wire_link(desc, field, record, expand)? {
                        debug!(
                            "Load navigation {} into entity {}",
                            link.title, entity.type_name
                        );
                        entity.navigation_links.push(link);
                    }
                }
                FieldTag::Parameter(_) | FieldTag::Untagged => {}
            }
        }

        if let Some(tag) = &desc.entity_type {
            if tag.keys.is_empty() {
                return Err(SchemaError::EmptyKey {
                    entity: desc.type_name.clone(),
                }
                .into());
            }
            let set_name = desc
                .entity_set_name()
                .ok_or_else(|| SchemaError::MissingEntitySet(desc.type_name.clone()))?;
            entity.id = entity_id(&tag.keys, &entity.properties)
                .map(|key| format!("{}{}", set_name, key));
        }

        Ok(entity)
    }

    /// Resolve a structured descriptor, checking its tag combination.
    fn structured(&self, type_name: &str) -> MarshalResult<&'a TypeDescriptor> {
        let desc = self
            .catalog
            .descriptor(type_name)
            .filter(|d| d.entity_type.is_some() || d.complex_type.is_some())
            .ok_or_else(|| MarshalError::NotStructured(type_name.to_string()))?;
        if desc.entity_type.is_some() && desc.entity_set.is_none() {
            return Err(SchemaError::MissingEntitySet(desc.type_name.clone()).into());
        }
        Ok(desc)
    }

    fn to_wire_property(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        record: &Record,
    ) -> MarshalResult<WireProperty> {
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        let declared = wire_declared(field);
        let (type_name, kind) = self.wire_type(owner, field, &declared)?;
        let value = self.to_wire_value(owner, field, &declared, value)?;
        Ok(WireProperty {
            name: field.edm_name().to_string(),
            type_name,
            kind,
            value,
        })
    }

    /// Protocol type name and value kind of a property field.
    fn wire_type(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        declared: &ValueType,
    ) -> MarshalResult<(String, ValueKind)> {
        let unrecognized = || SchemaError::UnrecognizedType {
            owner: owner.type_name.clone(),
            field: field.name.clone(),
            value_type: field.value_type.to_string(),
        };

        match declared {
            ValueType::Primitive(kind) => Ok((kind.edm_name().to_string(), ValueKind::Primitive)),
            ValueType::Enum(name) => Ok((self.enum_fqn(owner, field, name)?, ValueKind::Enum)),
            ValueType::Complex(name) => {
                Ok((self.complex_fqn(owner, field, name)?, ValueKind::Complex))
            }
            ValueType::Collection(element) => match element.as_ref() {
                ValueType::Primitive(kind) => Ok((
                    collection_of(kind.edm_name()),
                    ValueKind::CollectionPrimitive,
                )),
                ValueType::Enum(name) => Ok((
                    collection_of(&self.enum_fqn(owner, field, name)?),
                    ValueKind::CollectionEnum,
                )),
                ValueType::Complex(name) => Ok((
                    collection_of(&self.complex_fqn(owner, field, name)?),
                    ValueKind::CollectionComplex,
                )),
                _ => Err(MarshalError::IllegalCollection {
                    owner: owner.type_name.clone(),
                    field: field.name.clone(),
                }),
            },
            ValueType::Entity(_) | ValueType::Opaque(_) => Err(unrecognized().into()),
        }
    }

    fn enum_fqn(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        name: &str,
    ) -> MarshalResult<String> {
        self.catalog
            .descriptor(name)
            .and_then(|d| self.catalog.enum_type_fqn(d))
            .map(|fqn| fqn.to_string())
            .ok_or_else(|| unknown_type(owner, field, name))
    }

    fn complex_fqn(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        name: &str,
    ) -> MarshalResult<String> {
        self.catalog
            .descriptor(name)
            .and_then(|d| self.catalog.complex_type_fqn(d))
            .map(|fqn| fqn.to_string())
            .ok_or_else(|| unknown_type(owner, field, name))
    }

    fn to_wire_value(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        declared: &ValueType,
        value: &Value,
    ) -> MarshalResult<WireValue> {
        if value.is_null() {
            return Ok(WireValue::Null);
        }
        let mismatch = || MarshalError::ValueMismatch {
            owner: owner.type_name.clone(),
            field: field.name.clone(),
            expected: declared.to_string(),
            found: value.label().to_string(),
        };

        match declared {
            ValueType::Primitive(kind) => primitive_value(*kind, value)
                .map(WireValue::Primitive)
                .ok_or_else(mismatch),
            ValueType::Enum(name) => {
                let Value::Enum(member) = value else {
                    return Err(mismatch());
                };
                let tag = self
                    .catalog
                    .enum_tag(name)
                    .ok_or_else(|| unknown_type(owner, field, name))?;
                let declared_member =
                    tag.member(member)
                        .ok_or_else(|| MarshalError::UnknownEnumMember {
                            enum_type: name.clone(),
                            member: member.clone(),
                        })?;
                Ok(WireValue::Enum(declared_member.ordinal))
            }
            ValueType::Complex(name) => {
                let Value::Complex(nested) = value else {
                    return Err(mismatch());
                };
                if nested.type_name() != name {
                    return Err(mismatch());
                }
                let complex = self.to_wire_entity(nested, None)?;
                Ok(WireValue::Complex(WireComplex {
                    type_name: complex.type_name,
                    properties: complex.properties,
                }))
            }
            ValueType::Collection(element) => {
                let Value::Collection(items) = value else {
                    return Err(mismatch());
                };
                items
                    .iter()
                    .map(|item| self.to_wire_value(owner, field, element, item))
                    .collect::<MarshalResult<Vec<_>>>()
                    .map(WireValue::Collection)
            }
            ValueType::Entity(_) | ValueType::Opaque(_) => Err(SchemaError::UnrecognizedType {
                owner: owner.type_name.clone(),
                field: field.name.clone(),
                value_type: declared.to_string(),
            }
            .into()),
        }
    }

    /// Link for a navigation field; `None` unless `$expand` names it.
    fn to_wire_link(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        record: &Record,
        expand: Option<&ExpandOption>,
    ) -> MarshalResult<Option<WireLink>> {
        let title = field.edm_name();
        let Some(item) = expand.and_then(|e| e.find(title)) else {
            return Ok(None);
        };
        let nested = item.nested.as_ref();
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        let mismatch = |found: &Value| MarshalError::ValueMismatch {
            owner: owner.type_name.clone(),
            field: field.name.clone(),
            expected: field.value_type.to_string(),
            found: found.label().to_string(),
        };

        if field.value_type.is_collection() {
            let entities = match value {
                Value::Null => Vec::new(),
                Value::Collection(items) => {
                    let mut entities = Vec::with_capacity(items.len());
                    for item in items {
                        let Value::Entity(target) = item else {
                            return Err(mismatch(item));
                        };
                        entities.push(self.to_wire_entity(target, nested)?);
                    }
                    entities
                }
                other => return Err(mismatch(other)),
            };
            return Ok(Some(WireLink {
                title: title.to_string(),
                type_name: None,
                inline: WireInline::EntitySet(entities),
            }));
        }

        match value {
            Value::Null => Ok(None),
            Value::Entity(target) => {
                let entity = self.to_wire_entity(target, nested)?;
                Ok(Some(WireLink {
                    title: title.to_string(),
                    type_name: Some(entity.type_name.clone()),
                    inline: WireInline::Entity(Box::new(entity)),
                }))
            }
            other => Err(mismatch(other)),
        }
    }

    // =========================================================================
    // Wire -> record
    // =========================================================================

    /// Inflate a record of host type `type_name`. Unknown properties are ignored.
    pub fn from_wire_entity(&self, entity: &WireEntity, type_name: &str) -> MarshalResult<Record> {
        let desc = self.structured(type_name)?;
        let mut record = self.record_from_properties(desc, &entity.properties)?;

        for field in desc.navigations() {
            let Some(link) = entity.link(field.edm_name()) else {
                continue;
            };
            let target = field
                .navigation_target()
                .ok_or_else(|| unknown_type(desc, field, &field.value_type.to_string()))?;
            let value = match &link.inline {
                WireInline::Entity(inline) => Value::Entity(self.from_wire_entity(inline, target)?),
                WireInline::EntitySet(inline) => Value::Collection(
                    inline
                        .iter()
                        .map(|e| self.from_wire_entity(e, target).map(Value::Entity))
                        .collect::<MarshalResult<Vec<_>>>()?,
                ),
            };
            record.set(&field.name, value);
        }
        Ok(record)
    }

    fn record_from_properties(
        &self,
        desc: &TypeDescriptor,
        properties: &[WireProperty],
    ) -> MarshalResult<Record> {
        let mut record = Record::new(&desc.type_name);
        for field in desc.properties() {
            let Some(property) = properties.iter().find(|p| p.name == field.edm_name()) else {
                continue;
            };
            let value = self.from_wire_value(desc, field, &field.value_type, &property.value)?;
            record.set(&field.name, value);
        }
        Ok(record)
    }

    fn from_wire_value(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        declared: &ValueType,
        value: &WireValue,
    ) -> MarshalResult<Value> {
        let mismatch = |found: &str| MarshalError::ValueMismatch {
            owner: owner.type_name.clone(),
            field: field.name.clone(),
            expected: declared.to_string(),
            found: found.to_string(),
        };

        match (declared, value) {
            (_, WireValue::Null) => Ok(Value::Null),
            (ValueType::Primitive(kind), WireValue::Primitive(p)) => {
                domain_value(*kind, p).ok_or_else(|| mismatch(&p.to_string()))
            }
            (ValueType::Enum(name), WireValue::Enum(ordinal)) => {
                let tag = self
                    .catalog
                    .enum_tag(name)
                    .ok_or_else(|| unknown_type(owner, field, name))?;
                let member = tag.member_by_ordinal(*ordinal).ok_or_else(|| {
                    MarshalError::UnknownEnumOrdinal {
                        enum_type: name.clone(),
                        ordinal: *ordinal,
                    }
                })?;
                Ok(Value::Enum(member.name.clone()))
            }
            (ValueType::Complex(name), WireValue::Complex(complex)) => {
                let desc = self.structured(name)?;
                self.record_from_properties(desc, &complex.properties)
                    .map(Value::Complex)
            }
            (ValueType::Collection(element), WireValue::Collection(items)) => items
                .iter()
                .map(|item| self.from_wire_value(owner, field, element, item))
                .collect::<MarshalResult<Vec<_>>>()
                .map(Value::Collection),
            (_, WireValue::Primitive(_)) => Err(mismatch("primitive")),
            (_, WireValue::Enum(_)) => Err(mismatch("enum")),
            (_, WireValue::Complex(_)) => Err(mismatch("complex")),
            (_, WireValue::Collection(_)) => Err(mismatch("collection")),
        }
    }
}

/// Declared type of a property, with a primitive type override applied.
///
/// Overrides naming anything but a primitive are left to the schema.
fn wire_declared(field: &FieldDescriptor) -> ValueType {
    let overridden = field
        .as_property()
        .and_then(|tag| tag.type_override.as_deref())
        .map(|name| strip_collection(name.trim()).0)
        .and_then(PrimitiveKind::from_edm_name);
    match (overridden, &field.value_type) {
        (Some(kind), ValueType::Primitive(_)) => ValueType::Primitive(kind),
        (Some(kind), ValueType::Collection(element))
            if matches!(element.as_ref(), ValueType::Primitive(_)) =>
        {
            ValueType::collection(ValueType::Primitive(kind))
        }
        _ => field.value_type.clone(),
    }
}

fn unknown_type(owner: &TypeDescriptor, field: &FieldDescriptor, type_name: &str) -> MarshalError {
    SchemaError::UnknownType {
        type_name: type_name.to_string(),
        referenced_by: format!("{}.{}", owner.type_name, field.name),
    }
    .into()
}

/// Convert a domain value to a primitive of `kind`, widening integers.
fn primitive_value(kind: PrimitiveKind, value: &Value) -> Option<PrimitiveValue> {
    let primitive = match (kind, value) {
        (PrimitiveKind::SByte, Value::SByte(v)) => PrimitiveValue::SByte(*v),
        (PrimitiveKind::Int16, Value::SByte(_) | Value::Int16(_)) => {
            PrimitiveValue::Int16(i16::try_from(value.as_i64()?).ok()?)
        }
        (PrimitiveKind::Int32, Value::SByte(_) | Value::Int16(_) | Value::Int32(_)) => {
            PrimitiveValue::Int32(i32::try_from(value.as_i64()?).ok()?)
        }
        (PrimitiveKind::Int64, _) => PrimitiveValue::Int64(value.as_i64()?),
        (PrimitiveKind::Double, Value::Double(v)) => PrimitiveValue::Double(*v),
        (PrimitiveKind::Decimal, Value::Decimal(v)) => PrimitiveValue::Decimal(*v),
        (PrimitiveKind::String, Value::String(v)) => PrimitiveValue::String(v.clone()),
        (PrimitiveKind::Boolean, Value::Boolean(v)) => PrimitiveValue::Boolean(*v),
        (PrimitiveKind::Date, Value::Date(v)) => {
            PrimitiveValue::Calendar(Utc.from_utc_datetime(&v.and_hms_opt(0, 0, 0)?))
        }
        (PrimitiveKind::DateTimeOffset, Value::DateTime(v)) => {
            PrimitiveValue::Calendar(Utc.from_utc_datetime(v))
        }
        _ => return None,
    };
    Some(primitive)
}

/// Inverse of [`primitive_value`]; calendar instants become naive UTC values.
fn domain_value(kind: PrimitiveKind, value: &PrimitiveValue) -> Option<Value> {
    let domain = match (kind, value) {
        (PrimitiveKind::SByte, _) => Value::SByte(i8::try_from(integer(value)?).ok()?),
        (PrimitiveKind::Int16, _) => Value::Int16(i16::try_from(integer(value)?).ok()?),
        (PrimitiveKind::Int32, _) => Value::Int32(i32::try_from(integer(value)?).ok()?),
        (PrimitiveKind::Int64, _) => Value::Int64(integer(value)?),
        (PrimitiveKind::Double, PrimitiveValue::Double(v)) => Value::Double(*v),
        (PrimitiveKind::Decimal, PrimitiveValue::Decimal(v)) => Value::Decimal(*v),
        (PrimitiveKind::String, PrimitiveValue::String(v)) => Value::String(v.clone()),
        (PrimitiveKind::Boolean, PrimitiveValue::Boolean(v)) => Value::Boolean(*v),
        (PrimitiveKind::Date, PrimitiveValue::Calendar(v)) => Value::Date(v.date_naive()),
        (PrimitiveKind::DateTimeOffset, PrimitiveValue::Calendar(v)) => {
            Value::DateTime(v.naive_utc())
        }
        _ => return None,
    };
    Some(domain)
}

/// Integer wire values of any width; overridden properties may travel wider.
fn integer(value: &PrimitiveValue) -> Option<i64> {
    match value {
        PrimitiveValue::SByte(v) => Some(i64::from(*v)),
        PrimitiveValue::Int16(v) => Some(i64::from(*v)),
        PrimitiveValue::Int32(v) => Some(i64::from(*v)),
        PrimitiveValue::Int64(v) => Some(*v),
        _ => None,
    }
}

/// `(<Key>=<value>,...)` over the key properties present, in key order.
///
/// Spaces and angle brackets are percent-escaped. `None` when no key has a value.
pub fn entity_id(keys: &[String], properties: &[WireProperty]) -> Option<String> {
    let pairs: Vec<String> = keys
        .iter()
        .filter_map(|key| {
            let property = properties.iter().find(|p| &p.name == key)?;
            let text = property.value.key_text()?;
            Some(format!("{}={}", key, text))
        })
        .collect();
    if pairs.is_empty() {
        return None;
    }
    Some(escape_id(&format!("({})", pairs.join(","))))
}

fn escape_id(raw: &str) -> String {
    raw.replace(' ', "%20")
        .replace('<', "%3C")
        .replace('>', "%3E")
}
