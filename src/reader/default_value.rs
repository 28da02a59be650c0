//! Reader-side default values.
//!
//! A reader field that the writer never wrote is filled from its JSON
//! default literal. The literal is converted once, when the read plan is
//! built, into a [`DefaultValue`] tree and the flat event sequence that
//! tree replays as.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::error::SchemaError;
use crate::reader::event::{Event, Scalar};
use crate::schema::{NamedTypes, Schema};

/// A default literal converted against its declared schema.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Scalar(Scalar),
    /// Fields in the record schema's declaration order.
    Record(Vec<(Arc<str>, DefaultValue)>),
    Array(Vec<DefaultValue>),
    /// Entries in the order the literal lists them.
    Map(Vec<(Arc<str>, DefaultValue)>),
}

impl DefaultValue {
    /// Convert a JSON literal into a value of `schema`.
    ///
    /// Numbers widen to the declared kind. A union default is taken as a
    /// value of the union's first member.
    pub fn from_json(json: &Value, schema: &Schema, names: &NamedTypes) -> Result<Self, SchemaError> {
        let schema = names.resolve(schema)?;
        let value = match (json, schema) {
            (Value::Null, Schema::Null) => DefaultValue::Scalar(Scalar::Null),
            (Value::Bool(b), Schema::Boolean) => DefaultValue::Scalar(Scalar::Boolean(*b)),
            (Value::Number(_), Schema::Int) => {
                let v = integral(json)?;
                let v = i32::try_from(v).map_err(|_| {
                    invalid(format!("default {} is out of range for int", v))
                })?;
                DefaultValue::Scalar(Scalar::Int(v))
            }
            (Value::Number(_), Schema::Long) => DefaultValue::Scalar(Scalar::Long(integral(json)?)),
            (Value::Number(n), Schema::Float) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| invalid(format!("cannot convert {} to float", n)))?;
                DefaultValue::Scalar(Scalar::Float(v as f32))
            }
            (Value::Number(n), Schema::Double) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| invalid(format!("cannot convert {} to double", n)))?;
                DefaultValue::Scalar(Scalar::Double(v))
            }
            (Value::String(s), Schema::String) => DefaultValue::Scalar(Scalar::String(s.clone())),
            (Value::String(s), Schema::Bytes) => {
                DefaultValue::Scalar(Scalar::Bytes(Bytes::from(latin1_bytes(s)?)))
            }
            (Value::String(s), Schema::Fixed(fixed)) => {
                let bytes = latin1_bytes(s)?;
                if bytes.len() != fixed.size {
                    return Err(invalid(format!(
                        "fixed default for '{}' has {} bytes, expected {}",
                        fixed.fullname(),
                        bytes.len(),
                        fixed.size
                    )));
                }
                DefaultValue::Scalar(Scalar::Fixed(Bytes::from(bytes)))
            }
            (Value::String(s), Schema::Enum(enum_schema)) => {
                let index = enum_schema.symbol_index(s).ok_or_else(|| {
                    invalid(format!(
                        "unknown symbol '{}' for enum '{}'",
                        s,
                        enum_schema.fullname()
                    ))
                })?;
                DefaultValue::Scalar(Scalar::Enum {
                    index,
                    symbol: Arc::from(s.as_str()),
                })
            }
            (Value::Array(items), Schema::Array(item_schema)) => DefaultValue::Array(
                items
                    .iter()
                    .map(|item| DefaultValue::from_json(item, item_schema, names))
                    .collect::<Result<_, _>>()?,
            ),
            (Value::Object(entries), Schema::Map(value_schema)) => DefaultValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| {
                        Ok((
                            Arc::from(key.as_str()),
                            DefaultValue::from_json(value, value_schema, names)?,
                        ))
                    })
                    .collect::<Result<_, SchemaError>>()?,
            ),
            (Value::Object(entries), Schema::Record(record)) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let literal = entries.get(&field.name).or(field.default.as_ref()).ok_or_else(|| {
                        invalid(format!(
                            "default for record '{}' lacks field '{}'",
                            record.fullname(),
                            field.name
                        ))
                    })?;
                    fields.push((
                        Arc::from(field.name.as_str()),
                        DefaultValue::from_json(literal, &field.schema, names)?,
                    ));
                }
                DefaultValue::Record(fields)
            }
            (json, Schema::Union(variants)) => {
                let first = variants
                    .first()
                    .ok_or_else(|| invalid("default for an empty union".to_string()))?;
                DefaultValue::from_json(json, first, names)?
            }
            (json, Schema::Logical(logical)) => DefaultValue::from_json(json, &logical.base, names)?,
            (json, schema) => {
                return Err(invalid(format!(
                    "default {} does not match {}",
                    json,
                    schema.type_name()
                )))
            }
        };
        Ok(value)
    }

    /// The events this value replays as.
    pub fn events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        self.push_events(&mut events);
        events
    }

    fn push_events(&self, out: &mut Vec<Event>) {
        match self {
            DefaultValue::Scalar(scalar) => out.push(Event::Scalar(scalar.clone())),
            DefaultValue::Record(fields) => {
                out.push(Event::BeginRecord);
                for (name, value) in fields {
                    out.push(Event::FieldName(Arc::clone(name)));
                    value.push_events(out);
                }
                out.push(Event::EndRecord);
            }
            DefaultValue::Array(items) => {
                out.push(Event::BeginArray);
                for item in items {
                    item.push_events(out);
                }
                out.push(Event::EndArray);
            }
            DefaultValue::Map(entries) => {
                out.push(Event::BeginMap);
                for (key, value) in entries {
                    out.push(Event::FieldName(Arc::clone(key)));
                    value.push_events(out);
                }
                out.push(Event::EndMap);
            }
        }
    }
}

/// Replays a precomputed default in place of wire data.
#[derive(Debug, Clone)]
pub struct DefaultValueReader {
    value: DefaultValue,
    events: Arc<[Event]>,
}

impl DefaultValueReader {
    pub fn build(json: &Value, schema: &Schema, names: &NamedTypes) -> Result<Self, SchemaError> {
        let value = DefaultValue::from_json(json, schema, names)?;
        let events: Arc<[Event]> = Arc::from(value.events());
        Ok(Self { value, events })
    }

    pub fn value(&self) -> &DefaultValue {
        &self.value
    }

    pub fn events(&self) -> &Arc<[Event]> {
        &self.events
    }
}

fn integral(json: &Value) -> Result<i64, SchemaError> {
    if let Some(v) = json.as_i64() {
        return Ok(v);
    }
    match json.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        _ => Err(invalid(format!("default {} is not an integer", json))),
    }
}

/// Bytes and fixed defaults are strings whose code points are byte values.
fn latin1_bytes(s: &str) -> Result<Vec<u8>, SchemaError> {
    s.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| invalid(format!("character {:?} is not a byte value", c)))
        })
        .collect()
}

fn invalid(reason: String) -> SchemaError {
    SchemaError::InvalidSchema(format!("Invalid default: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;
    use serde_json::json;

    fn convert(json: Value, schema: &str) -> Result<DefaultValue, SchemaError> {
        let schema = parse_schema(schema).unwrap();
        let names = NamedTypes::build_from_schema(&schema);
        DefaultValue::from_json(&json, &schema, &names)
    }

    #[test]
    fn test_numbers_widen_to_declared_kind() {
        assert_eq!(
            convert(json!(7), r#""long""#).unwrap(),
            DefaultValue::Scalar(Scalar::Long(7))
        );
        assert_eq!(
            convert(json!(2), r#""double""#).unwrap(),
            DefaultValue::Scalar(Scalar::Double(2.0))
        );
        assert_eq!(
            convert(json!(3.0), r#""int""#).unwrap(),
            DefaultValue::Scalar(Scalar::Int(3))
        );
        assert!(convert(json!(3.5), r#""int""#).is_err());
        assert!(convert(json!(1_i64 << 40), r#""int""#).is_err());
    }

    #[test]
    fn test_bytes_default_uses_code_points() {
        assert_eq!(
            convert(json!("\u{00ff}A"), r#""bytes""#).unwrap(),
            DefaultValue::Scalar(Scalar::Bytes(Bytes::from_static(&[0xFF, 0x41])))
        );
        assert!(convert(json!("\u{0100}"), r#""bytes""#).is_err());
    }

    #[test]
    fn test_map_default_keeps_literal_order() {
        let value = convert(json!({"z": 1, "a": 2}), r#"{"type": "map", "values": "int"}"#).unwrap();
        let events = value.events();
        assert_eq!(
            events,
            vec![
                Event::BeginMap,
                Event::FieldName(Arc::from("z")),
                Event::Scalar(Scalar::Int(1)),
                Event::FieldName(Arc::from("a")),
                Event::Scalar(Scalar::Int(2)),
                Event::EndMap,
            ]
        );
    }

    #[test]
    fn test_record_default_fills_nested_field_defaults() {
        let schema = r#"{
            "type": "record", "name": "Point",
            "fields": [
                {"name": "x", "type": "int"},
                {"name": "y", "type": "int", "default": 9}
            ]
        }"#;
        let value = convert(json!({"x": 1}), schema).unwrap();
        assert_eq!(
            value,
            DefaultValue::Record(vec![
                (Arc::from("x"), DefaultValue::Scalar(Scalar::Int(1))),
                (Arc::from("y"), DefaultValue::Scalar(Scalar::Int(9))),
            ])
        );
        assert!(convert(json!({"y": 1}), schema).is_err());
    }

    #[test]
    fn test_union_default_uses_first_member() {
        assert_eq!(
            convert(json!(null), r#"["null", "string"]"#).unwrap(),
            DefaultValue::Scalar(Scalar::Null)
        );
        assert!(convert(json!("x"), r#"["null", "string"]"#).is_err());
    }

    #[test]
    fn test_enum_default_must_be_symbol() {
        let schema = r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#;
        assert_eq!(
            convert(json!("B"), schema).unwrap(),
            DefaultValue::Scalar(Scalar::Enum {
                index: 1,
                symbol: Arc::from("B")
            })
        );
        assert!(convert(json!("C"), schema).is_err());
    }

    #[test]
    fn test_reader_precomputes_events() {
        let schema = parse_schema(r#"{"type": "array", "items": "string"}"#).unwrap();
        let names = NamedTypes::new();
        let reader = DefaultValueReader::build(&json!(["a"]), &schema, &names).unwrap();
        assert_eq!(reader.events().len(), 3);
        assert!(matches!(reader.value(), DefaultValue::Array(items) if items.len() == 1));
    }
}
