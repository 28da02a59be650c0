//! JSON schema parser.
//!
//! Parses schema JSON into the [`Schema`] tree. Named types are registered
//! before their fields are parsed so that recursive references resolve to
//! [`Schema::Named`]. Keys the format does not define are kept as custom
//! properties so that a parse/write cycle is lossless.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SchemaError;
use crate::schema::{
    qualify, EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    Properties, RecordSchema, Schema,
};

const RECORD_KEYS: &[&str] = &["type", "name", "namespace", "doc", "aliases", "fields"];
const FIELD_KEYS: &[&str] = &["name", "type", "default", "doc", "order", "aliases"];
const ENUM_KEYS: &[&str] = &[
    "type", "name", "namespace", "doc", "aliases", "symbols", "default",
];
const FIXED_KEYS: &[&str] = &[
    "type",
    "name",
    "namespace",
    "doc",
    "aliases",
    "size",
    "logicalType",
    "precision",
    "scale",
];

/// Parse a schema from a JSON string.
///
/// ```
/// use contrail::schema::{parse_schema, Schema};
///
/// let schema = parse_schema(r#""string""#).unwrap();
/// assert_eq!(schema, Schema::String);
/// ```
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    parse_schema_with_options(json, false)
}

/// Parse a schema from a JSON string with validation options.
///
/// In strict mode duplicate union members, nested unions and names outside
/// `[A-Za-z_][A-Za-z0-9_]*` are errors. In permissive mode (default) they
/// are logged as warnings.
///
/// ```
/// use contrail::schema::parse_schema_with_options;
///
/// assert!(parse_schema_with_options(r#"["int", "int"]"#, false).is_ok());
/// assert!(parse_schema_with_options(r#"["int", "int"]"#, true).is_err());
/// ```
pub fn parse_schema_with_options(json: &str, strict: bool) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;

    let mut parser = SchemaParser::new().with_strict(strict);
    parser.parse(&value)
}

/// Schema parser with a named type registry.
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Named types by fully qualified name
    named_types: HashMap<String, Schema>,
    /// Namespace for resolving unqualified names
    current_namespace: Option<String>,
    strict_schema: bool,
}

impl SchemaParser {
    /// Create a new permissive parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new parser with strict validation enabled.
    pub fn new_strict() -> Self {
        Self::new().with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Parse a JSON value into a Schema.
    pub fn parse(&mut self, value: &Value) -> Result<Schema, SchemaError> {
        match value {
            Value::String(s) => self.parse_string_schema(s),
            Value::Object(obj) => self.parse_object_schema(obj),
            Value::Array(arr) => self.parse_union_schema(arr),
            _ => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {}",
                value
            ))),
        }
    }

    /// Named types defined so far.
    pub fn named_types(&self) -> &HashMap<String, Schema> {
        &self.named_types
    }

    fn parse_string_schema(&self, s: &str) -> Result<Schema, SchemaError> {
        match primitive(s) {
            Some(schema) => Ok(schema),
            None => {
                let fullname = self.resolve_name(s);
                if !self.named_types.contains_key(&fullname) {
                    // Forward references are allowed; they fail at resolution.
                    warn!(name = %fullname, "reference to a type that is not yet defined");
                }
                Ok(Schema::Named(fullname))
            }
        }
    }

    fn parse_object_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        let type_str = match type_value {
            Value::String(s) => s.as_str(),
            // {"type": {...}} or {"type": [...]} wraps another schema
            nested => return self.parse(nested),
        };

        let base = match type_str {
            "record" | "error" => return self.parse_record_schema(obj),
            "enum" => return self.parse_enum_schema(obj),
            "array" => return self.parse_array_schema(obj),
            "map" => return self.parse_map_schema(obj),
            "fixed" => self.parse_fixed_schema(obj)?,
            other => match primitive(other) {
                Some(schema) => schema,
                None => {
                    let fullname = self.resolve_name(other);
                    if self.named_types.contains_key(&fullname) {
                        Schema::Named(fullname)
                    } else {
                        return Err(SchemaError::UnsupportedType(format!(
                            "Unknown type: {}",
                            other
                        )));
                    }
                }
            },
        };

        match obj.get("logicalType") {
            Some(logical_type) => self.parse_logical_type(obj, logical_type, base),
            None => Ok(base),
        }
    }

    fn parse_union_schema(&mut self, arr: &[Value]) -> Result<Schema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }

        let variants = arr
            .iter()
            .map(|v| self.parse(v))
            .collect::<Result<Vec<_>, _>>()?;

        self.validate_union(&variants)?;
        Ok(Schema::Union(variants))
    }

    fn parse_record_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let (name, namespace) = self.parse_name(obj, "Record")?;
        let fullname = qualify(&name, namespace.as_deref());

        if self.named_types.contains_key(&fullname)
            && !matches!(self.named_types.get(&fullname), Some(Schema::Named(_)))
        {
            return Err(SchemaError::InvalidSchema(format!(
                "Type '{}' is defined more than once",
                fullname
            )));
        }

        // Register before parsing fields so recursive references resolve.
        self.named_types
            .insert(fullname.clone(), Schema::Named(fullname.clone()));

        let fields_value = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                SchemaError::InvalidSchema(format!("Record '{}' missing 'fields' array", fullname))
            })?;

        let prev_namespace = self.current_namespace.clone();
        self.current_namespace = namespace.clone();
        let fields = fields_value
            .iter()
            .map(|f| self.parse_field_schema(f))
            .collect::<Result<Vec<_>, _>>();
        self.current_namespace = prev_namespace;
        let fields = fields?;

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Record '{}' has duplicate field '{}'",
                    fullname, field.name
                )));
            }
        }

        let record = RecordSchema {
            name,
            namespace,
            fields,
            doc: string_value(obj, "doc"),
            aliases: string_list(obj, "aliases"),
            properties: extra_properties(obj, RECORD_KEYS),
        };

        let schema = Schema::Record(record);
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_field_schema(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?
            .to_string();
        self.validate_name(&name, "Field")?;

        let type_value = obj.get("type").ok_or_else(|| {
            SchemaError::InvalidSchema(format!("Field '{}' missing 'type'", name))
        })?;
        let schema = self.parse(type_value)?;

        let order = match obj.get("order").and_then(|v| v.as_str()) {
            Some(s) => FieldOrder::parse(s).unwrap_or_else(|| {
                warn!(field = %name, order = %s, "unknown field order, using ascending");
                FieldOrder::Ascending
            }),
            None => FieldOrder::Ascending,
        };

        Ok(FieldSchema {
            schema,
            default: obj.get("default").cloned(),
            doc: string_value(obj, "doc"),
            order,
            aliases: string_list(obj, "aliases"),
            properties: extra_properties(obj, FIELD_KEYS),
            name,
        })
    }

    fn parse_enum_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let (name, namespace) = self.parse_name(obj, "Enum")?;
        let fullname = qualify(&name, namespace.as_deref());

        let symbols = obj
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(format!(
                "Enum '{}' must have at least one symbol",
                fullname
            )));
        }
        for symbol in &symbols {
            self.validate_name(symbol, "Enum symbol")?;
        }

        let default = string_value(obj, "default");
        if let Some(default) = &default {
            if !symbols.contains(default) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Enum '{}' default '{}' is not one of its symbols",
                    fullname, default
                )));
            }
        }

        let schema = Schema::Enum(EnumSchema {
            name,
            namespace,
            symbols,
            doc: string_value(obj, "doc"),
            aliases: string_list(obj, "aliases"),
            default,
            properties: extra_properties(obj, ENUM_KEYS),
        });
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_array_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let items = obj
            .get("items")
            .ok_or_else(|| SchemaError::InvalidSchema("Array missing 'items' field".to_string()))?;
        Ok(Schema::Array(Box::new(self.parse(items)?)))
    }

    fn parse_map_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let values = obj
            .get("values")
            .ok_or_else(|| SchemaError::InvalidSchema("Map missing 'values' field".to_string()))?;
        Ok(Schema::Map(Box::new(self.parse(values)?)))
    }

    fn parse_fixed_schema(&mut self, obj: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let (name, namespace) = self.parse_name(obj, "Fixed")?;
        let fullname = qualify(&name, namespace.as_deref());

        let size = obj.get("size").and_then(|v| v.as_u64()).ok_or_else(|| {
            SchemaError::InvalidSchema(format!("Fixed '{}' missing 'size' field", fullname))
        })? as usize;

        let schema = Schema::Fixed(FixedSchema {
            name,
            namespace,
            size,
            doc: string_value(obj, "doc"),
            aliases: string_list(obj, "aliases"),
            properties: extra_properties(obj, FIXED_KEYS),
        });
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_logical_type(
        &mut self,
        obj: &Map<String, Value>,
        logical_type_value: &Value,
        base: Schema,
    ) -> Result<Schema, SchemaError> {
        let logical_type_name = logical_type_value.as_str().ok_or_else(|| {
            SchemaError::InvalidSchema("logicalType must be a string".to_string())
        })?;

        let logical_type = match logical_type_name {
            "decimal" => {
                let precision = obj
                    .get("precision")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| {
                        SchemaError::InvalidSchema("Decimal missing 'precision'".to_string())
                    })? as u32;
                let scale = obj.get("scale").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                LogicalTypeName::Decimal { precision, scale }
            }
            "uuid" => LogicalTypeName::Uuid,
            "date" => LogicalTypeName::Date,
            "time-millis" => LogicalTypeName::TimeMillis,
            "time-micros" => LogicalTypeName::TimeMicros,
            "timestamp-millis" => LogicalTypeName::TimestampMillis,
            "timestamp-micros" => LogicalTypeName::TimestampMicros,
            "duration" => LogicalTypeName::Duration,
            "local-timestamp-millis" => LogicalTypeName::LocalTimestampMillis,
            "local-timestamp-micros" => LogicalTypeName::LocalTimestampMicros,
            other => {
                // Unknown logical types fall back to the base type.
                warn!(logical_type = %other, "ignoring unknown logical type");
                return Ok(base);
            }
        };

        Ok(Schema::Logical(LogicalType::new(base, logical_type)))
    }

    /// Read `name`/`namespace`, returning the unqualified name and the
    /// effective namespace (explicit, from a dotted name, or inherited).
    fn parse_name(
        &self,
        obj: &Map<String, Value>,
        context: &str,
    ) -> Result<(String, Option<String>), SchemaError> {
        let raw = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema(format!("{} missing 'name' field", context)))?;

        let (name, namespace) = match raw.rsplit_once('.') {
            Some((ns, simple)) => (simple.to_string(), Some(ns.to_string())),
            None => {
                let ns = obj
                    .get("namespace")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .or_else(|| self.current_namespace.clone())
                    .filter(|ns| !ns.is_empty());
                (raw.to_string(), ns)
            }
        };

        self.validate_name(&name, context)?;
        Ok((name, namespace))
    }

    fn resolve_name(&self, name: &str) -> String {
        if primitive(name).is_some() {
            return name.to_string();
        }
        let qualified = qualify(name, self.current_namespace.as_deref());
        if self.named_types.contains_key(&qualified) || name.contains('.') {
            qualified
        } else if self.named_types.contains_key(name) {
            // Defined in the null namespace
            name.to_string()
        } else {
            qualified
        }
    }

    /// Names must start with [A-Za-z_] and contain only [A-Za-z0-9_].
    fn validate_name(&self, name: &str, context: &str) -> Result<(), SchemaError> {
        if is_valid_name(name) {
            return Ok(());
        }
        let msg = format!(
            "{} name '{}' must match [A-Za-z_][A-Za-z0-9_]*",
            context, name
        );
        if self.strict_schema {
            Err(SchemaError::InvalidSchema(msg))
        } else {
            warn!("{}", msg);
            Ok(())
        }
    }

    /// Unions must not contain duplicate types or nested unions.
    fn validate_union(&self, variants: &[Schema]) -> Result<(), SchemaError> {
        let mut seen_types = HashSet::new();
        for (i, variant) in variants.iter().enumerate() {
            let msg = if matches!(variant, Schema::Union(_)) {
                Some(format!(
                    "Union contains nested union at position {} (unions cannot be nested)",
                    i
                ))
            } else {
                let key = union_key(variant);
                (!seen_types.insert(key.clone()))
                    .then(|| format!("Union contains duplicate type '{}' at position {}", key, i))
            };

            if let Some(msg) = msg {
                if self.strict_schema {
                    return Err(SchemaError::InvalidSchema(msg));
                }
                warn!("{}", msg);
            }
        }
        Ok(())
    }
}

/// Whether `name` follows the `[A-Za-z_][A-Za-z0-9_]*` grammar.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn primitive(name: &str) -> Option<Schema> {
    match name {
        "null" => Some(Schema::Null),
        "boolean" => Some(Schema::Boolean),
        "int" => Some(Schema::Int),
        "long" => Some(Schema::Long),
        "float" => Some(Schema::Float),
        "double" => Some(Schema::Double),
        "bytes" => Some(Schema::Bytes),
        "string" => Some(Schema::String),
        _ => None,
    }
}

/// Key identifying a union member for duplicate detection.
fn union_key(schema: &Schema) -> String {
    match schema {
        Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_) | Schema::Named(_) => {
            schema.fullname().unwrap_or_default()
        }
        Schema::Logical(lt) => union_key(&lt.base),
        other => other.type_name(),
    }
}

fn string_value(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn extra_properties(obj: &Map<String, Value>, known: &[&str]) -> Properties {
    obj.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
