//! Generic values.
//!
//! [`Datum`] is a plain value tree matching the wire format. It is what
//! [`collect_datum`] folds a decoder's events into, and what
//! [`write_datum`] encodes against a schema. Unions carry no wrapper: the
//! writer picks the branch from the datum's shape, and the reader reports
//! only the selected member.

use bytes::Bytes;

use crate::codec::pool::DEFAULT_BUFFER_CAPACITY;
use crate::codec::{BufferPool, Encoder, PoolStrategy, PooledBuffer};
use crate::error::{DecodeError, EncodeError};
use crate::reader::{DefaultValue, Event, Scalar, StructureDecoder};
use crate::schema::{NamedTypes, Schema};

/// A decoded or to-be-encoded value.
///
/// Equality compares floating point values bit for bit and record fields
/// regardless of their order.
#[derive(Debug, Clone)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
    Fixed(Bytes),
    /// Enum symbol.
    Enum(String),
    Array(Vec<Datum>),
    /// Entries in wire order.
    Map(Vec<(String, Datum)>),
    Record(Vec<(String, Datum)>),
}

impl Datum {
    /// Build a record datum from `(name, value)` pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Datum)>,
        S: Into<String>,
    {
        Datum::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Value of a record field.
    pub fn field(&self, name: &str) -> Option<&Datum> {
        match self {
            Datum::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short description for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Null => "null",
            Datum::Boolean(_) => "boolean",
            Datum::Int(_) => "int",
            Datum::Long(_) => "long",
            Datum::Float(_) => "float",
            Datum::Double(_) => "double",
            Datum::Bytes(_) => "bytes",
            Datum::String(_) => "string",
            Datum::Fixed(_) => "fixed",
            Datum::Enum(_) => "enum",
            Datum::Array(_) => "array",
            Datum::Map(_) => "map",
            Datum::Record(_) => "record",
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => true,
            (Datum::Boolean(a), Datum::Boolean(b)) => a == b,
            (Datum::Int(a), Datum::Int(b)) => a == b,
            (Datum::Long(a), Datum::Long(b)) => a == b,
            (Datum::Float(a), Datum::Float(b)) => a.to_bits() == b.to_bits(),
            (Datum::Double(a), Datum::Double(b)) => a.to_bits() == b.to_bits(),
            (Datum::Bytes(a), Datum::Bytes(b)) | (Datum::Fixed(a), Datum::Fixed(b)) => a == b,
            (Datum::String(a), Datum::String(b)) | (Datum::Enum(a), Datum::Enum(b)) => a == b,
            (Datum::Array(a), Datum::Array(b)) => a == b,
            (Datum::Map(a), Datum::Map(b)) => a == b,
            (Datum::Record(a), Datum::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(name, value)| b.iter().any(|(n, v)| n == name && v == value))
            }
            _ => false,
        }
    }
}

impl From<Scalar> for Datum {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Datum::Null,
            Scalar::Boolean(b) => Datum::Boolean(b),
            Scalar::Int(v) => Datum::Int(v),
            Scalar::Long(v) => Datum::Long(v),
            Scalar::Float(v) => Datum::Float(v),
            Scalar::Double(v) => Datum::Double(v),
            Scalar::Bytes(b) => Datum::Bytes(b),
            Scalar::String(s) => Datum::String(s),
            Scalar::Fixed(b) => Datum::Fixed(b),
            Scalar::Enum { symbol, .. } => Datum::Enum(symbol.to_string()),
        }
    }
}

impl From<&DefaultValue> for Datum {
    fn from(value: &DefaultValue) -> Self {
        match value {
            DefaultValue::Scalar(scalar) => Datum::from(scalar.clone()),
            DefaultValue::Record(fields) => Datum::Record(
                fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), Datum::from(value)))
                    .collect(),
            ),
            DefaultValue::Array(items) => Datum::Array(items.iter().map(Datum::from).collect()),
            DefaultValue::Map(entries) => Datum::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), Datum::from(value)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Event collection
// ============================================================================

enum Partial {
    Record(Vec<(String, Datum)>, Option<String>),
    Array(Vec<Datum>),
    Map(Vec<(String, Datum)>, Option<String>),
}

/// Fold the events of the next root value into a [`Datum`].
///
/// Returns `None` at the end of the stream.
pub fn collect_datum(decoder: &mut StructureDecoder<'_>) -> Result<Option<Datum>, DecodeError> {
    let mut stack: Vec<Partial> = Vec::new();
    loop {
        let event = match decoder.next_event()? {
            Some(event) => event,
            None if stack.is_empty() => return Ok(None),
            None => return Err(DecodeError::UnexpectedEof),
        };
        let completed = match event {
            Event::BeginRecord => {
                stack.push(Partial::Record(Vec::new(), None));
                continue;
            }
            Event::BeginArray => {
                stack.push(Partial::Array(Vec::new()));
                continue;
            }
            Event::BeginMap => {
                stack.push(Partial::Map(Vec::new(), None));
                continue;
            }
            Event::FieldName(name) => {
                match stack.last_mut() {
                    Some(Partial::Record(_, key)) | Some(Partial::Map(_, key)) => {
                        *key = Some(name.to_string())
                    }
                    _ => return Err(unexpected("field name outside a record or map")),
                }
                continue;
            }
            Event::Scalar(scalar) => Datum::from(scalar),
            Event::EndRecord => match stack.pop() {
                Some(Partial::Record(fields, None)) => Datum::Record(fields),
                _ => return Err(unexpected("unbalanced end of record")),
            },
            Event::EndArray => match stack.pop() {
                Some(Partial::Array(items)) => Datum::Array(items),
                _ => return Err(unexpected("unbalanced end of array")),
            },
            Event::EndMap => match stack.pop() {
                Some(Partial::Map(entries, None)) => Datum::Map(entries),
                _ => return Err(unexpected("unbalanced end of map")),
            },
        };

        match stack.last_mut() {
            None => return Ok(Some(completed)),
            Some(Partial::Array(items)) => items.push(completed),
            Some(Partial::Record(entries, key)) | Some(Partial::Map(entries, key)) => {
                let name = key
                    .take()
                    .ok_or_else(|| unexpected("value without a field name"))?;
                entries.push((name, completed));
            }
        }
    }
}

/// Collect every remaining root value.
pub fn collect_all(decoder: &mut StructureDecoder<'_>) -> Result<Vec<Datum>, DecodeError> {
    let mut values = Vec::new();
    while let Some(value) = collect_datum(decoder)? {
        values.push(value);
    }
    Ok(values)
}

fn unexpected(what: &str) -> DecodeError {
    DecodeError::InvalidData(format!("Malformed event stream: {}", what))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode one datum against `schema`.
///
/// Encoding goes through this thread's scratch buffers; the result is copied
/// out at its exact size.
pub fn encode_datum(schema: &Schema, datum: &Datum) -> Result<Bytes, EncodeError> {
    encode_all(schema, std::slice::from_ref(datum))
}

/// Encode a sequence of root values back to back.
pub fn encode_all(schema: &Schema, data: &[Datum]) -> Result<Bytes, EncodeError> {
    let pool = BufferPool::new(PoolStrategy::ThreadLocal);
    let lease = encode_all_pooled(&pool, schema, data)?;
    Ok(Bytes::copy_from_slice(&lease[..]))
}

/// Encode one datum into a buffer leased from `pool`. Dropping the result
/// returns the buffer.
pub fn encode_datum_pooled(
    pool: &BufferPool,
    schema: &Schema,
    datum: &Datum,
) -> Result<PooledBuffer, EncodeError> {
    encode_all_pooled(pool, schema, std::slice::from_ref(datum))
}

/// Encode a sequence of root values into a buffer leased from `pool`.
pub fn encode_all_pooled(
    pool: &BufferPool,
    schema: &Schema,
    data: &[Datum],
) -> Result<PooledBuffer, EncodeError> {
    let names = NamedTypes::build_from_schema(schema);
    let mut encoder = Encoder::pooled(pool, DEFAULT_BUFFER_CAPACITY);
    for datum in data {
        write_datum(&mut encoder, schema, datum, &names)?;
    }
    Ok(encoder
        .into_pooled()
        .unwrap_or_else(|| unreachable!("pooled encoder always holds a lease")))
}

/// Append `datum` encoded as `schema`.
///
/// Ints widen to long, float and double where the schema asks for them.
/// Record fields absent from the datum are written from their defaults.
pub fn write_datum(
    encoder: &mut Encoder,
    schema: &Schema,
    datum: &Datum,
    names: &NamedTypes,
) -> Result<(), EncodeError> {
    let schema = resolve(schema, names)?;
    match (schema, datum) {
        (Schema::Union(branches), _) => {
            let index = select_branch(branches, datum, names).ok_or_else(|| mismatch(datum, schema))?;
            encoder.write_union_index(index);
            write_datum(encoder, &branches[index], datum, names)
        }
        (Schema::Null, Datum::Null) => {
            encoder.write_null();
            Ok(())
        }
        (Schema::Boolean, Datum::Boolean(b)) => {
            encoder.write_boolean(*b);
            Ok(())
        }
        (Schema::Int, Datum::Int(v)) => {
            encoder.write_int(*v);
            Ok(())
        }
        (Schema::Long, Datum::Int(v)) => {
            encoder.write_long(*v as i64);
            Ok(())
        }
        (Schema::Long, Datum::Long(v)) => {
            encoder.write_long(*v);
            Ok(())
        }
        (Schema::Float, Datum::Int(v)) => {
            encoder.write_float(*v as f32);
            Ok(())
        }
        (Schema::Float, Datum::Long(v)) => {
            encoder.write_float(*v as f32);
            Ok(())
        }
        (Schema::Float, Datum::Float(v)) => {
            encoder.write_float(*v);
            Ok(())
        }
        (Schema::Double, Datum::Int(v)) => {
            encoder.write_double(*v as f64);
            Ok(())
        }
        (Schema::Double, Datum::Long(v)) => {
            encoder.write_double(*v as f64);
            Ok(())
        }
        (Schema::Double, Datum::Float(v)) => {
            encoder.write_double(*v as f64);
            Ok(())
        }
        (Schema::Double, Datum::Double(v)) => {
            encoder.write_double(*v);
            Ok(())
        }
        (Schema::Bytes, Datum::Bytes(b)) => {
            encoder.write_bytes(b);
            Ok(())
        }
        (Schema::String, Datum::String(s)) => {
            encoder.write_string(s);
            Ok(())
        }
        (Schema::Fixed(fixed), Datum::Fixed(b)) if b.len() == fixed.size => {
            encoder.write_fixed(b);
            Ok(())
        }
        (Schema::Enum(enum_schema), Datum::Enum(symbol)) => {
            let index = enum_schema
                .symbol_index(symbol)
                .ok_or_else(|| mismatch(datum, schema))?;
            encoder.write_enum_index(index);
            Ok(())
        }
        (Schema::Array(items), Datum::Array(values)) => {
            if !values.is_empty() {
                encoder.write_block_count(values.len());
                for value in values {
                    write_datum(encoder, items, value, names)?;
                }
            }
            encoder.write_block_count(0);
            Ok(())
        }
        (Schema::Map(value_schema), Datum::Map(entries)) => {
            if !entries.is_empty() {
                encoder.write_block_count(entries.len());
                for (key, value) in entries {
                    encoder.write_string(key);
                    write_datum(encoder, value_schema, value, names)?;
                }
            }
            encoder.write_block_count(0);
            Ok(())
        }
        (Schema::Record(record), Datum::Record(_)) => {
            for field in &record.fields {
                match datum.field(&field.name) {
                    Some(value) => write_datum(encoder, &field.schema, value, names)?,
                    None => {
                        let default = field.default.as_ref().ok_or_else(|| EncodeError::MissingField {
                            record: record.fullname(),
                            field: field.name.clone(),
                        })?;
                        let value = DefaultValue::from_json(default, &field.schema, names)
                            .map_err(|e| EncodeError::InvalidDefault(e.to_string()))?;
                        write_datum(encoder, &field.schema, &Datum::from(&value), names)?;
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch(datum, schema)),
    }
}

/// Follow named references and strip logical tags.
fn resolve<'a>(schema: &'a Schema, names: &'a NamedTypes) -> Result<&'a Schema, EncodeError> {
    let resolved = names
        .resolve(schema)
        .map_err(|_| EncodeError::Unresolved(schema.type_name()))?;
    match resolved {
        Schema::Logical(logical) => resolve(&logical.base, names),
        other => Ok(other),
    }
}

/// The union member for a datum: the first that holds it as is, else the
/// first it widens into.
fn select_branch(branches: &[Schema], datum: &Datum, names: &NamedTypes) -> Option<usize> {
    for widen in [false, true] {
        let found = branches.iter().position(|branch| match resolve(branch, names) {
            Ok(schema) => datum_fits(schema, datum, widen),
            Err(_) => false,
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

fn datum_fits(schema: &Schema, datum: &Datum, widen: bool) -> bool {
    match (schema, datum) {
        (Schema::Null, Datum::Null)
        | (Schema::Boolean, Datum::Boolean(_))
        | (Schema::Int, Datum::Int(_))
        | (Schema::Long, Datum::Long(_))
        | (Schema::Float, Datum::Float(_))
        | (Schema::Double, Datum::Double(_))
        | (Schema::Bytes, Datum::Bytes(_))
        | (Schema::String, Datum::String(_))
        | (Schema::Array(_), Datum::Array(_))
        | (Schema::Map(_), Datum::Map(_)) => true,
        (Schema::Long, Datum::Int(_))
        | (Schema::Float, Datum::Int(_) | Datum::Long(_))
        | (Schema::Double, Datum::Int(_) | Datum::Long(_) | Datum::Float(_)) => widen,
        (Schema::Fixed(fixed), Datum::Fixed(b)) => b.len() == fixed.size,
        (Schema::Enum(e), Datum::Enum(symbol)) => e.symbol_index(symbol).is_some(),
        (Schema::Record(record), Datum::Record(fields)) => {
            fields.iter().all(|(name, _)| record.field(name).is_some())
                && record
                    .fields
                    .iter()
                    .all(|f| f.default.is_some() || fields.iter().any(|(n, _)| *n == f.name))
        }
        _ => false,
    }
}

fn mismatch(datum: &Datum, schema: &Schema) -> EncodeError {
    EncodeError::Mismatch {
        datum: datum.kind().to_string(),
        schema: schema.type_name(),
    }
}
