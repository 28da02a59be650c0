//! Thread-safe, generate-once schema cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::registry::SchemaRegistry;
use super::visitor::Describe;
use super::{generate_schema_with_config, GeneratorConfig};
use crate::error::GenerationError;
use crate::schema::Schema;

#[derive(Debug, Default)]
struct CacheInner {
    registry: SchemaRegistry,
    schemas: HashMap<TypeId, Arc<Schema>>,
}

/// Shared cache of generated schemas.
///
/// The first caller for a type generates its schema under the lock; every
/// later caller receives the same `Arc`.
#[derive(Debug, Default)]
pub struct SchemaCache {
    inner: Mutex<CacheInner>,
    config: GeneratorConfig,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn schema_for<T: Describe>(&self) -> Result<Arc<Schema>, GenerationError> {
        let id = TypeId::of::<T>();
        let mut inner = self.inner.lock();
        if let Some(schema) = inner.schemas.get(&id) {
            return Ok(Arc::clone(schema));
        }

        debug!("Schema cache miss for {}", std::any::type_name::<T>());
        let schema = Arc::new(generate_schema_with_config::<T>(
            &mut inner.registry,
            &self.config,
        )?);
        inner.schemas.insert(id, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.schemas.clear();
        inner.registry = SchemaRegistry::new();
    }
}
