//! Named types produced by generation, keyed by Rust type.

use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};

use super::annotations::TypeInfo;
use crate::error::GenerationError;
use crate::schema::Schema;

/// A named type known to the registry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub fullname: String,
    pub rust_name: &'static str,
    /// `None` while the type's members are still being generated.
    pub schema: Option<Schema>,
}

impl RegistryEntry {
    pub fn is_complete(&self) -> bool {
        self.schema.is_some()
    }
}

/// Opaque registry position used to undo a failed generation.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

/// Registry of generated schemas.
///
/// Named types (records, enums) are registered before their members are
/// visited, so a recursive reference finds the placeholder and becomes a
/// by-name reference. Root schemas produced by
/// [`generate_schema`](super::generate_schema) are also kept so they can be
/// looked up with [`schema_of`](Self::schema_of).
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: HashMap<TypeId, RegistryEntry>,
    names: HashMap<String, TypeId>,
    roots: HashMap<TypeId, Schema>,
    log: Vec<TypeId>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a placeholder for a named type.
    pub fn begin(&mut self, ty: &TypeInfo) -> Result<(), GenerationError> {
        let fullname = ty.fullname();
        if self.entries.contains_key(&ty.id) {
            return Err(GenerationError::DuplicateRegistration(fullname));
        }
        if let Some(other) = self.names.get(&fullname) {
            if *other != ty.id {
                return Err(GenerationError::DuplicateRegistration(fullname));
            }
        }
        self.names.insert(fullname.clone(), ty.id);
        self.entries.insert(
            ty.id,
            RegistryEntry {
                fullname,
                rust_name: ty.rust_name,
                schema: None,
            },
        );
        self.log.push(ty.id);
        Ok(())
    }

    /// Attach the finished definition to a registered type.
    pub fn complete(&mut self, id: TypeId, schema: Schema) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.schema = Some(schema);
        }
    }

    /// By-name reference to a registered type.
    pub fn reference(&self, id: TypeId) -> Option<Schema> {
        self.entries
            .get(&id)
            .map(|entry| Schema::Named(entry.fullname.clone()))
    }

    pub fn entry(&self, id: TypeId) -> Option<&RegistryEntry> {
        self.entries.get(&id)
    }

    pub fn lookup_name(&self, fullname: &str) -> Option<&RegistryEntry> {
        self.names.get(fullname).and_then(|id| self.entries.get(id))
    }

    /// Rewrite `schema` so it stands on its own.
    ///
    /// The first mention of a registered type, in document order, is replaced
    /// by its definition. Later mentions and mentions inside the type's own
    /// definition stay by name. Names the registry does not know are kept.
    pub fn expand(&self, schema: &Schema) -> Schema {
        let mut defined = HashSet::new();
        self.expand_into(schema, &mut defined)
    }

    fn expand_into(&self, schema: &Schema, defined: &mut HashSet<String>) -> Schema {
        match schema {
            Schema::Named(name) => {
                if defined.contains(name) {
                    return schema.clone();
                }
                match self.lookup_name(name).and_then(|entry| entry.schema.as_ref()) {
                    Some(definition) => self.expand_into(definition, defined),
                    None => schema.clone(),
                }
            }
            Schema::Record(record) => {
                let fullname = record.fullname();
                if !defined.insert(fullname.clone()) {
                    return Schema::Named(fullname);
                }
                let mut record = record.clone();
                for field in &mut record.fields {
                    field.schema = self.expand_into(&field.schema, defined);
                }
                Schema::Record(record)
            }
            Schema::Enum(e) => {
                let fullname = e.fullname();
                if defined.insert(fullname.clone()) {
                    schema.clone()
                } else {
                    Schema::Named(fullname)
                }
            }
            Schema::Fixed(f) => {
                let fullname = f.fullname();
                if defined.insert(fullname.clone()) {
                    schema.clone()
                } else {
                    Schema::Named(fullname)
                }
            }
            Schema::Array(items) => Schema::Array(Box::new(self.expand_into(items, defined))),
            Schema::Map(values) => Schema::Map(Box::new(self.expand_into(values, defined))),
            Schema::Union(branches) => Schema::Union(
                branches
                    .iter()
                    .map(|branch| self.expand_into(branch, defined))
                    .collect(),
            ),
            Schema::Logical(logical) => {
                let mut logical = logical.clone();
                logical.base = Box::new(self.expand_into(&logical.base, defined));
                Schema::Logical(logical)
            }
            other => other.clone(),
        }
    }

    pub(crate) fn record_root(&mut self, id: TypeId, schema: Schema) {
        self.roots.insert(id, schema);
    }

    pub(crate) fn root(&self, id: TypeId) -> Option<&Schema> {
        self.roots.get(&id)
    }

    /// The generated schema for `T`.
    pub fn schema_of<T: ?Sized + 'static>(&self) -> Result<&Schema, GenerationError> {
        let id = TypeId::of::<T>();
        self.roots
            .get(&id)
            .or_else(|| self.entries.get(&id).and_then(|e| e.schema.as_ref()))
            .ok_or_else(|| GenerationError::NotGenerated(type_name::<T>().to_string()))
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.roots.contains_key(&id) || self.entries.contains_key(&id)
    }

    /// Number of registered named types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.log.len())
    }

    /// Forget every named type registered after `mark`.
    pub(crate) fn rollback(&mut self, mark: Checkpoint) {
        for id in self.log.drain(mark.0..) {
            if let Some(entry) = self.entries.remove(&id) {
                self.names.remove(&entry.fullname);
            }
        }
    }
}
