//! Per-field and per-value readers.
//!
//! A [`FieldReader`] says what to do with one record field: materialize it
//! from the wire, skip the writer's bytes, replay a default, or fail because
//! unsafe resolution left the field without a value. A [`ValueReader`] is
//! the materializing part, either a scalar decoded in place or a structured
//! node of the read plan.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::decode;
use crate::error::DecodeError;
use crate::reader::default_value::DefaultValueReader;
use crate::reader::event::Scalar;
use crate::reader::plan::NodeId;
use crate::schema::{Schema, TypePromotion};

/// Decodes one scalar, applying a promotion when writer and reader differ.
#[derive(Debug, Clone)]
pub enum ScalarReader {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed(usize),
    Enum(Arc<EnumMapping>),
    Promote(TypePromotion),
}

impl ScalarReader {
    #[inline]
    pub fn read(&self, data: &mut &[u8]) -> Result<Scalar, DecodeError> {
        let scalar = match self {
            ScalarReader::Null => Scalar::Null,
            ScalarReader::Boolean => Scalar::Boolean(decode::decode_boolean(data)?),
            ScalarReader::Int => Scalar::Int(decode::decode_int(data)?),
            ScalarReader::Long => Scalar::Long(decode::decode_long(data)?),
            ScalarReader::Float => Scalar::Float(decode::decode_float(data)?),
            ScalarReader::Double => Scalar::Double(decode::decode_double(data)?),
            ScalarReader::Bytes => {
                Scalar::Bytes(Bytes::copy_from_slice(decode::decode_bytes_ref(data)?))
            }
            ScalarReader::String => Scalar::String(decode::decode_string(data)?),
            ScalarReader::Fixed(size) => {
                Scalar::Fixed(Bytes::copy_from_slice(decode::decode_fixed_ref(data, *size)?))
            }
            ScalarReader::Enum(mapping) => mapping.read(data)?,
            ScalarReader::Promote(promotion) => read_promoted(*promotion, data)?,
        };
        Ok(scalar)
    }
}

fn read_promoted(promotion: TypePromotion, data: &mut &[u8]) -> Result<Scalar, DecodeError> {
    let scalar = match promotion {
        TypePromotion::IntToLong => Scalar::Long(decode::decode_int(data)? as i64),
        TypePromotion::IntToFloat => Scalar::Float(decode::decode_int(data)? as f32),
        TypePromotion::IntToDouble => Scalar::Double(decode::decode_int(data)? as f64),
        TypePromotion::LongToFloat => Scalar::Float(decode::decode_long(data)? as f32),
        TypePromotion::LongToDouble => Scalar::Double(decode::decode_long(data)? as f64),
        TypePromotion::FloatToDouble => Scalar::Double(decode::decode_float(data)? as f64),
        TypePromotion::StringToBytes => {
            Scalar::Bytes(Bytes::copy_from_slice(decode::decode_bytes_ref(data)?))
        }
        TypePromotion::BytesToString => Scalar::String(decode::decode_string(data)?),
    };
    Ok(scalar)
}

/// Maps writer enum indices to reader symbols.
#[derive(Debug, Clone)]
pub struct EnumMapping {
    /// Reader enum full name, for errors.
    pub name: String,
    pub writer_symbols: Vec<String>,
    /// Reader index and symbol per writer index; `None` when the reader
    /// neither knows the symbol nor declares a default.
    pub targets: Vec<Option<(usize, Arc<str>)>>,
}

impl EnumMapping {
    /// Identity mapping for an enum read with its own schema.
    pub fn identity(name: String, symbols: &[String]) -> Self {
        Self {
            name,
            writer_symbols: symbols.to_vec(),
            targets: symbols
                .iter()
                .enumerate()
                .map(|(i, s)| Some((i, Arc::from(s.as_str()))))
                .collect(),
        }
    }

    fn read(&self, data: &mut &[u8]) -> Result<Scalar, DecodeError> {
        let index = decode::decode_enum_index(data, self.targets.len())?;
        match &self.targets[index] {
            Some((reader_index, symbol)) => Ok(Scalar::Enum {
                index: *reader_index,
                symbol: Arc::clone(symbol),
            }),
            None => Err(DecodeError::UnknownEnumSymbol {
                enum_name: self.name.clone(),
                symbol: self.writer_symbols[index].clone(),
            }),
        }
    }
}

/// How a value is materialized.
#[derive(Debug, Clone)]
pub enum ValueReader {
    Scalar(ScalarReader),
    /// Record, array, map or union node of the plan.
    Structured(NodeId),
    /// Deferred incompatibility; fails when the value is reached.
    Incompatible(Arc<str>),
}

/// What happens to one record field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Materialize(ValueReader),
    /// Writer-only field: consume and discard its bytes.
    Skip(Schema),
    /// Reader-only field with a default.
    Default(DefaultValueReader),
    /// Reader-only field without a default, left by unsafe resolution.
    Missing,
}

#[derive(Debug, Clone)]
pub struct FieldReader {
    /// Name reported for the field; the reader's name when both sides have it.
    pub name: Arc<str>,
    /// Type of the field's schema, for diagnostics.
    pub type_name: String,
    pub kind: FieldKind,
}

impl FieldReader {
    pub fn new(name: &str, type_name: String, kind: FieldKind) -> Self {
        Self {
            name: Arc::from(name),
            type_name,
            kind,
        }
    }
}
