//! Named type definitions in scope for a schema tree.
//!
//! Records, enums and fixed types are defined once and referenced by full
//! name afterwards. [`NamedTypes`] collects the definitions of a tree so that
//! [`Schema::Named`] references can be followed during resolution, skipping
//! and encoding.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Registry of named type definitions by fully qualified name.
#[derive(Debug, Clone, Default)]
pub struct NamedTypes {
    definitions: HashMap<String, Schema>,
}

impl NamedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every named definition reachable from `schema`.
    pub fn build_from_schema(schema: &Schema) -> Self {
        let mut names = Self::new();
        names.extract(schema);
        names
    }

    /// Register a definition under `name`.
    pub fn register(&mut self, name: String, schema: Schema) {
        self.definitions.insert(name, schema);
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Follow `Named` references until a concrete schema is reached.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, SchemaError> {
        let mut current = schema;
        // A chain longer than the number of definitions can only be a loop.
        for _ in 0..=self.definitions.len() {
            match current {
                Schema::Named(name) => {
                    current = self.definitions.get(name).ok_or_else(|| {
                        SchemaError::InvalidSchema(format!(
                            "Unresolved named type reference: '{}'",
                            name
                        ))
                    })?;
                }
                other => return Ok(other),
            }
        }
        Err(SchemaError::InvalidSchema(format!(
            "Named type reference cycle at '{}'",
            schema.type_name()
        )))
    }

    fn extract(&mut self, schema: &Schema) {
        match schema {
            Schema::Record(record) => {
                if self.definitions.contains_key(&record.fullname()) {
                    return;
                }
                self.definitions.insert(record.fullname(), schema.clone());
                for field in &record.fields {
                    self.extract(&field.schema);
                }
            }
            Schema::Enum(enum_schema) => {
                self.definitions
                    .insert(enum_schema.fullname(), schema.clone());
            }
            Schema::Fixed(fixed_schema) => {
                self.definitions
                    .insert(fixed_schema.fullname(), schema.clone());
            }
            Schema::Array(items) => self.extract(items),
            Schema::Map(values) => self.extract(values),
            Schema::Union(variants) => {
                for variant in variants {
                    self.extract(variant);
                }
            }
            Schema::Logical(logical) => self.extract(&logical.base),
            // Primitives and references don't define anything
            _ => {}
        }
    }
}
