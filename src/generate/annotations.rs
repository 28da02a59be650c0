//! Type-level and field-level metadata consumed by the generator.

use std::any::{type_name, TypeId};

use serde_json::Value;

use crate::schema::{qualify, FieldOrder, LogicalTypeName, Properties, Schema};

/// Width class of an integral or floating point shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Byte,
    Short,
    Int,
    Long,
    /// Integers wider than 64 bits (or unsigned 64-bit).
    BigInteger,
    Float,
    Double,
    BigDecimal,
    /// Width not known statically.
    Unknown,
}

/// What a map key looks like once written as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    String,
    Integer,
    Boolean,
    Char,
    Enum,
    /// Structured keys (records, collections, ...).
    Unsupported,
}

impl KeyShape {
    pub fn is_stringable(&self) -> bool {
        !matches!(self, KeyShape::Unsupported)
    }
}

/// Logical type a shape should be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalHint {
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    LocalTimestampMillis,
    LocalTimestampMicros,
    Uuid,
    Decimal { precision: u32, scale: u32 },
}

impl LogicalHint {
    /// Wire primitive and tag for this hint.
    ///
    /// `fixed` only matters for decimals, which are then carried by a fixed
    /// type instead of bytes.
    pub(crate) fn to_schema(self, fixed: Option<Schema>) -> Schema {
        let (base, name) = match self {
            LogicalHint::Date => (Schema::Int, LogicalTypeName::Date),
            LogicalHint::TimeMillis => (Schema::Int, LogicalTypeName::TimeMillis),
            LogicalHint::TimeMicros => (Schema::Long, LogicalTypeName::TimeMicros),
            LogicalHint::TimestampMillis => (Schema::Long, LogicalTypeName::TimestampMillis),
            LogicalHint::TimestampMicros => (Schema::Long, LogicalTypeName::TimestampMicros),
            LogicalHint::LocalTimestampMillis => {
                (Schema::Long, LogicalTypeName::LocalTimestampMillis)
            }
            LogicalHint::LocalTimestampMicros => {
                (Schema::Long, LogicalTypeName::LocalTimestampMicros)
            }
            LogicalHint::Uuid => (Schema::String, LogicalTypeName::Uuid),
            LogicalHint::Decimal { precision, scale } => (
                fixed.unwrap_or(Schema::Bytes),
                LogicalTypeName::Decimal { precision, scale },
            ),
        };
        Schema::Logical(crate::schema::LogicalType::new(base, name))
    }
}

/// Identity and metadata of a describable type.
///
/// Built with [`TypeInfo::of`] and refined with the `with_*` builders. The
/// schema name defaults to the last path segment of the Rust type name and
/// the namespace to its module path.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: TypeId,
    pub rust_name: &'static str,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    /// Literal schema JSON used instead of describing the type.
    pub schema_override: Option<String>,
    pub fixed: Option<usize>,
    pub meta: Properties,
    pub logical: Option<LogicalHint>,
    /// Values of this type can never be absent.
    pub primitive: bool,
    /// Values of this type may be absent (`Option<T>`).
    pub nullable: bool,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            name: None,
            namespace: None,
            doc: None,
            aliases: Vec::new(),
            schema_override: None,
            fixed: None,
            meta: Properties::new(),
            logical: None,
            primitive: false,
            nullable: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_schema_override(mut self, json: impl Into<String>) -> Self {
        self.schema_override = Some(json.into());
        self
    }

    pub fn with_fixed(mut self, size: usize) -> Self {
        self.fixed = Some(size);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_logical(mut self, hint: LogicalHint) -> Self {
        self.logical = Some(hint);
        self
    }

    pub fn primitive(mut self) -> Self {
        self.primitive = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Unqualified schema name.
    pub fn schema_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let path = base_path(self.rust_name);
                path.rsplit("::").next().unwrap_or(path).to_string()
            }
        }
    }

    /// Namespace, explicit or derived from the module path.
    pub fn schema_namespace(&self) -> Option<String> {
        if self.namespace.is_some() {
            return self.namespace.clone();
        }
        if self.name.is_some() {
            return None;
        }
        base_path(self.rust_name)
            .rsplit_once("::")
            .map(|(module, _)| module.replace("::", "."))
    }

    pub fn fullname(&self) -> String {
        qualify(&self.schema_name(), self.schema_namespace().as_deref())
    }
}

fn base_path(rust_name: &str) -> &str {
    match rust_name.find('<') {
        Some(idx) => &rust_name[..idx],
        None => rust_name,
    }
}

/// Per-field metadata attached to a [`Property`](super::Property).
#[derive(Debug, Clone, Default)]
pub struct FieldAnnotations {
    pub schema_override: Option<String>,
    /// Explicit JSON default.
    pub default: Option<Value>,
    /// Generic metadata default, parsed as JSON when possible.
    pub default_value: Option<String>,
    pub required: bool,
    pub order: Option<FieldOrder>,
    pub aliases: Vec<String>,
    pub meta: Properties,
    pub fixed: Option<usize>,
    pub logical: Option<LogicalHint>,
    pub doc: Option<String>,
}

impl FieldAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_override(mut self, json: impl Into<String>) -> Self {
        self.schema_override = Some(json.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_default_value(mut self, text: impl Into<String>) -> Self {
        self.default_value = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_order(mut self, order: FieldOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_fixed(mut self, size: usize) -> Self {
        self.fixed = Some(size);
        self
    }

    pub fn with_logical(mut self, hint: LogicalHint) -> Self {
        self.logical = Some(hint);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The effective default, before required-field rules are applied.
    pub(crate) fn declared_default(&self) -> Option<Value> {
        if let Some(value) = &self.default {
            return Some(value.clone());
        }
        self.default_value.as_ref().map(|text| {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
        })
    }
}
