//! Decode events.
//!
//! Decoding produces a flat stream of events, the shape a generic streaming
//! token parser expects. Records and maps both open a structured value and
//! announce each entry with a [`Event::FieldName`]. Unions are transparent:
//! only the selected member's events appear.

use std::sync::Arc;

use bytes::Bytes;

/// A scalar value as it appeared on the wire (after any promotion).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
    Fixed(Bytes),
    /// Enum symbol, with its index in the reader's symbol list.
    Enum { index: usize, symbol: Arc<str> },
}

impl Scalar {
    /// Short description for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Boolean(_) => "boolean",
            Scalar::Int(_) => "int",
            Scalar::Long(_) => "long",
            Scalar::Float(_) => "float",
            Scalar::Double(_) => "double",
            Scalar::Bytes(_) => "bytes",
            Scalar::String(_) => "string",
            Scalar::Fixed(_) => "fixed",
            Scalar::Enum { .. } => "enum",
        }
    }
}

/// One step of a decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    BeginRecord,
    BeginArray,
    BeginMap,
    /// Record field name or map key.
    FieldName(Arc<str>),
    Scalar(Scalar),
    EndRecord,
    EndArray,
    EndMap,
}

impl Event {
    /// Whether this event opens a structured value.
    pub fn is_begin(&self) -> bool {
        matches!(self, Event::BeginRecord | Event::BeginArray | Event::BeginMap)
    }

    /// Whether this event closes a structured value.
    pub fn is_end(&self) -> bool {
        matches!(self, Event::EndRecord | Event::EndArray | Event::EndMap)
    }
}
