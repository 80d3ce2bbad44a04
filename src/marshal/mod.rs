//! Entity marshalling.
//!
//! Domain records ([`record`]) on one side, the wire model handed to the
//! serializer ([`wire`]) on the other, with [`EntityMarshaller`] between them.

pub mod error;
pub mod marshaller;
pub mod record;
pub mod wire;

pub use error::{MarshalError, MarshalResult};
pub use marshaller::{entity_id, EntityMarshaller};
pub use record::{Record, Structured, Value};
pub use wire::{
    PrimitiveValue, ValueKind, WireCollection, WireComplex, WireEntity, WireInline, WireLink,
    WireProperty, WireValue,
};
