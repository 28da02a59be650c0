//! Schema node types.
//!
//! A [`Schema`] is a tagged tree. Records, enums and fixed types carry a
//! global `(namespace, name)` identity; once defined they are referenced
//! elsewhere in the same tree through [`Schema::Named`], which is also how
//! recursive records refer to themselves.

use serde_json::{json, Map, Value};

/// Custom metadata attached to a schema node (`{"key": value}` pairs not
/// otherwise understood by the format).
pub type Properties = Map<String, Value>;

/// A wire schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    // Primitive types
    /// Null type - no value.
    Null,
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of bytes.
    Bytes,
    /// Unicode string.
    String,

    // Complex types
    /// Record type with named fields.
    Record(RecordSchema),
    /// Enumeration type.
    Enum(EnumSchema),
    /// Array of items with a single schema.
    Array(Box<Schema>),
    /// Map with string keys and values of a single schema.
    Map(Box<Schema>),
    /// Union of multiple schemas. Branch order fixes the wire index.
    Union(Vec<Schema>),
    /// Fixed-size byte array.
    Fixed(FixedSchema),

    /// Reference to a named type defined elsewhere (by full name).
    Named(String),

    /// Logical type tag over a wire primitive.
    Logical(LogicalType),
}

/// Join a name with a namespace unless the name is already qualified.
pub fn qualify(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() && !name.contains('.') => format!("{}.{}", ns, name),
        _ => name.to_string(),
    }
}

/// Record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub fields: Vec<FieldSchema>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub properties: Properties,
}

impl RecordSchema {
    /// Create a new RecordSchema with the given name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields,
            doc: None,
            aliases: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> String {
        qualify(&self.name, self.namespace.as_deref())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Full names of all aliases, qualified with this record's namespace.
    pub fn qualified_aliases(&self) -> Vec<String> {
        self.aliases
            .iter()
            .map(|a| qualify(a, self.namespace.as_deref()))
            .collect()
    }

    /// Serialize the record schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("record"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }

        let fields: Vec<Value> = self.fields.iter().map(|f| f.to_json_value()).collect();
        obj.insert("fields".to_string(), Value::Array(fields));

        extend_properties(&mut obj, &self.properties);
        Value::Object(obj)
    }
}

/// Schema for a field within a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub schema: Schema,
    /// Default literal used when a reader finds the field missing from the writer.
    pub default: Option<Value>,
    pub doc: Option<String>,
    pub order: FieldOrder,
    pub aliases: Vec<String>,
    pub properties: Properties,
}

impl FieldSchema {
    /// Create a new FieldSchema with the given name and schema.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
            order: FieldOrder::Ascending,
            aliases: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Serialize the field schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), self.schema.to_json_value());

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        if self.order != FieldOrder::Ascending {
            obj.insert("order".to_string(), json!(self.order.as_str()));
        }
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }

        extend_properties(&mut obj, &self.properties);
        Value::Object(obj)
    }
}

/// Field sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOrder::Ascending => "ascending",
            FieldOrder::Descending => "descending",
            FieldOrder::Ignore => "ignore",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ascending" => Some(FieldOrder::Ascending),
            "descending" => Some(FieldOrder::Descending),
            "ignore" => Some(FieldOrder::Ignore),
            _ => None,
        }
    }
}

/// Schema for an enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub symbols: Vec<String>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    /// Symbol substituted for writer symbols the reader does not know.
    pub default: Option<String>,
    pub properties: Properties,
}

impl EnumSchema {
    /// Create a new EnumSchema with the given name and symbols.
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            symbols,
            doc: None,
            aliases: Vec::new(),
            default: None,
            properties: Properties::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the fallback symbol.
    pub fn with_default(mut self, symbol: impl Into<String>) -> Self {
        self.default = Some(symbol.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(&self.name, self.namespace.as_deref())
    }

    /// Get the index of a symbol.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn qualified_aliases(&self) -> Vec<String> {
        self.aliases
            .iter()
            .map(|a| qualify(a, self.namespace.as_deref()))
            .collect()
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("enum"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }

        obj.insert("symbols".to_string(), json!(&self.symbols));

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), json!(default));
        }

        extend_properties(&mut obj, &self.properties);
        Value::Object(obj)
    }
}

/// Schema for a fixed-size byte array.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: String,
    pub namespace: Option<String>,
    /// Size in bytes. Declared by the schema, never present on the wire.
    pub size: usize,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub properties: Properties,
}

impl FixedSchema {
    /// Create a new FixedSchema with the given name and size.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size,
            doc: None,
            aliases: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(&self.name, self.namespace.as_deref())
    }

    pub fn qualified_aliases(&self) -> Vec<String> {
        self.aliases
            .iter()
            .map(|a| qualify(a, self.namespace.as_deref()))
            .collect()
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("fixed"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }

        obj.insert("size".to_string(), json!(self.size));

        extend_properties(&mut obj, &self.properties);
        Value::Object(obj)
    }
}

/// Logical type tag around a base schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    /// The underlying wire schema.
    pub base: Box<Schema>,
    pub logical_type: LogicalTypeName,
}

impl LogicalType {
    pub fn new(base: Schema, logical_type: LogicalTypeName) -> Self {
        Self {
            base: Box::new(base),
            logical_type,
        }
    }

    /// Serialize as the base type object plus `logicalType` and its parameters.
    pub fn to_json_value(&self) -> Value {
        let mut obj = match self.base.to_json_value() {
            Value::Object(m) => m,
            other => {
                let mut m = Map::new();
                m.insert("type".to_string(), other);
                m
            }
        };

        obj.insert("logicalType".to_string(), json!(self.logical_type.name()));

        if let LogicalTypeName::Decimal { precision, scale } = &self.logical_type {
            obj.insert("precision".to_string(), json!(precision));
            if *scale > 0 {
                obj.insert("scale".to_string(), json!(scale));
            }
        }

        Value::Object(obj)
    }
}

/// Logical type names with their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeName {
    /// Decimal with precision and scale (bytes or fixed).
    Decimal { precision: u32, scale: u32 },
    /// UUID (string or fixed[16]).
    Uuid,
    /// Days since Unix epoch (int).
    Date,
    /// Milliseconds after midnight (int).
    TimeMillis,
    /// Microseconds after midnight (long).
    TimeMicros,
    /// Milliseconds since Unix epoch (long).
    TimestampMillis,
    /// Microseconds since Unix epoch (long).
    TimestampMicros,
    /// Months, days, milliseconds (fixed[12]).
    Duration,
    LocalTimestampMillis,
    LocalTimestampMicros,
}

impl LogicalTypeName {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTypeName::Decimal { .. } => "decimal",
            LogicalTypeName::Uuid => "uuid",
            LogicalTypeName::Date => "date",
            LogicalTypeName::TimeMillis => "time-millis",
            LogicalTypeName::TimeMicros => "time-micros",
            LogicalTypeName::TimestampMillis => "timestamp-millis",
            LogicalTypeName::TimestampMicros => "timestamp-micros",
            LogicalTypeName::Duration => "duration",
            LogicalTypeName::LocalTimestampMillis => "local-timestamp-millis",
            LogicalTypeName::LocalTimestampMicros => "local-timestamp-micros",
        }
    }
}

fn extend_properties(obj: &mut Map<String, Value>, properties: &Properties) {
    for (key, value) in properties {
        obj.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

impl Schema {
    /// Check if this schema is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Schema::Null
                | Schema::Boolean
                | Schema::Int
                | Schema::Long
                | Schema::Float
                | Schema::Double
                | Schema::Bytes
                | Schema::String
        )
    }

    /// Check if this schema is a named type definition (record, enum, or fixed).
    pub fn is_named(&self) -> bool {
        matches!(self, Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_))
    }

    /// Get the fully qualified name of a named type or reference.
    pub fn fullname(&self) -> Option<String> {
        match self {
            Schema::Record(r) => Some(r.fullname()),
            Schema::Enum(e) => Some(e.fullname()),
            Schema::Fixed(f) => Some(f.fullname()),
            Schema::Named(n) => Some(n.clone()),
            Schema::Logical(l) => l.base.fullname(),
            _ => None,
        }
    }

    /// Check if this schema is a union containing null.
    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Union(variants) => variants.iter().any(|v| matches!(v, Schema::Null)),
            _ => false,
        }
    }

    /// The schema with any logical tag removed.
    pub fn base(&self) -> &Schema {
        match self {
            Schema::Logical(l) => l.base.base(),
            other => other,
        }
    }

    /// Short human-readable description used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Schema::Null => "null".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Int => "int".to_string(),
            Schema::Long => "long".to_string(),
            Schema::Float => "float".to_string(),
            Schema::Double => "double".to_string(),
            Schema::Bytes => "bytes".to_string(),
            Schema::String => "string".to_string(),
            Schema::Record(r) => format!("record '{}'", r.fullname()),
            Schema::Enum(e) => format!("enum '{}'", e.fullname()),
            Schema::Fixed(f) => format!("fixed '{}'", f.fullname()),
            Schema::Array(_) => "array".to_string(),
            Schema::Map(_) => "map".to_string(),
            Schema::Union(_) => "union".to_string(),
            Schema::Named(n) => format!("'{}'", n),
            Schema::Logical(l) => format!("{} ({})", l.logical_type.name(), l.base.type_name()),
        }
    }

    /// Serialize the schema to a JSON string.
    ///
    /// ```
    /// use contrail::schema::Schema;
    ///
    /// assert_eq!(Schema::String.to_json(), r#""string""#);
    /// ```
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Serialize the schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        match self {
            Schema::Null => json!("null"),
            Schema::Boolean => json!("boolean"),
            Schema::Int => json!("int"),
            Schema::Long => json!("long"),
            Schema::Float => json!("float"),
            Schema::Double => json!("double"),
            Schema::Bytes => json!("bytes"),
            Schema::String => json!("string"),

            Schema::Record(r) => r.to_json_value(),
            Schema::Enum(e) => e.to_json_value(),
            Schema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_value()
            }),
            Schema::Map(values) => json!({
                "type": "map",
                "values": values.to_json_value()
            }),
            Schema::Union(variants) => {
                Value::Array(variants.iter().map(|v| v.to_json_value()).collect())
            }
            Schema::Fixed(f) => f.to_json_value(),
            Schema::Named(name) => json!(name),
            Schema::Logical(lt) => lt.to_json_value(),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}
