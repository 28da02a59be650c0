//! Schema generation from Rust types.
//!
//! A type implements [`Describe`] to report its shape to a [`ShapeVisitor`];
//! [`generate_schema`] drives that description and assembles the schema.
//! Named types are registered in a [`SchemaRegistry`] before their members are
//! visited, so recursive types refer to themselves by name.
//!
//! ```
//! use contrail::generate::{generate_schema, Describe, Property, SchemaRegistry, ShapeVisitor, TypeInfo};
//! use contrail::{GenerationError, Schema};
//!
//! struct Node {
//!     _value: i32,
//!     _next: Option<Box<Node>>,
//! }
//!
//! impl Describe for Node {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::of::<Node>().with_name("Node").with_namespace("demo")
//!     }
//!
//!     fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
//!         if let Some(record) = visitor.expect_record(&Self::type_info())? {
//!             record.property(Property::of::<i32>("value").required())?;
//!             record.property(Property::of::<Option<Box<Node>>>("next"))?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = SchemaRegistry::new();
//! let schema = generate_schema::<Node>(&mut registry).unwrap();
//! let Schema::Record(record) = schema else { panic!() };
//! assert_eq!(
//!     record.field("next").unwrap().schema,
//!     Schema::Union(vec![Schema::Null, Schema::Named("demo.Node".into())])
//! );
//! ```

mod annotations;
mod builders;
mod cache;
mod describe;
mod registry;
mod visitor;

use std::any::TypeId;

pub use annotations::{FieldAnnotations, KeyShape, LogicalHint, NumberKind, TypeInfo};
pub use cache::SchemaCache;
pub use registry::{Checkpoint, RegistryEntry, SchemaRegistry};
pub use visitor::{ArrayShape, Describe, Element, MapShape, Property, RecordShape, ShapeVisitor};

use crate::error::GenerationError;
use crate::schema::Schema;

/// Generator options.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Keep declared defaults on required fields.
    pub always_allow_default: bool,
    /// Tag dates, times, UUIDs and decimals with logical types.
    pub logical_types: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            always_allow_default: false,
            logical_types: true,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_always_allow_default(mut self, allow: bool) -> Self {
        self.always_allow_default = allow;
        self
    }

    pub fn with_logical_types(mut self, enabled: bool) -> Self {
        self.logical_types = enabled;
        self
    }
}

/// Generate the schema for `T` with the default configuration.
pub fn generate_schema<T: Describe>(
    registry: &mut SchemaRegistry,
) -> Result<Schema, GenerationError> {
    generate_schema_with_config::<T>(registry, &GeneratorConfig::default())
}

/// Generate the schema for `T`.
///
/// A type generated before through the same registry returns its stored
/// schema. The result carries the definition of every named type it uses,
/// including types registered by earlier calls. On failure every named type
/// registered by this call is forgotten.
pub fn generate_schema_with_config<T: Describe>(
    registry: &mut SchemaRegistry,
    config: &GeneratorConfig,
) -> Result<Schema, GenerationError> {
    let id = TypeId::of::<T>();
    if let Some(schema) = registry.root(id) {
        return Ok(schema.clone());
    }
    // Defined earlier as a member of another type.
    if let Some(schema) = registry.entry(id).and_then(|entry| entry.schema.as_ref()) {
        let schema = registry.expand(schema);
        registry.record_root(id, schema.clone());
        return Ok(schema);
    }

    let mark = registry.checkpoint();
    match builders::generate_element(
        registry,
        config,
        &Element::of::<T>(),
        builders::Hints::default(),
    ) {
        Ok(schema) => {
            // Types defined by earlier roots appear here by name only.
            let schema = registry.expand(&schema);
            registry.record_root(id, schema.clone());
            Ok(schema)
        }
        Err(e) => {
            registry.rollback(mark);
            Err(e)
        }
    }
}
