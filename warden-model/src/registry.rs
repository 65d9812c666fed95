//! Process-wide cache of compiled schemas.
//!
//! Created once by the host (usually inside an [`Engine`](crate::Engine))
//! and shared by reference. Each entity type compiles at most once:
//! compilation runs under the write lock, so concurrent first requests for
//! the same type serialize and all observe the same `Arc`.

use crate::definition::EntityDefinition;
use crate::error::ModelResult;
use crate::schema::{CompiledSchema, SchemaCompiler};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

pub struct SchemaRegistry {
    compiler: SchemaCompiler,
    cache: RwLock<HashMap<String, Arc<CompiledSchema>>>,
}

impl SchemaRegistry {
    pub fn new(compiler: SchemaCompiler) -> Self {
        Self {
            compiler,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    /// Returns the cached schema for `entity_type`, if compiled.
    pub fn get(&self, entity_type: &str) -> Option<Arc<CompiledSchema>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_type)
            .cloned()
    }

    /// Compiles `definition` unless its entity type is already cached, in
    /// which case the cached schema is returned and nothing else happens.
    pub fn compile(&self, definition: &EntityDefinition) -> ModelResult<Arc<CompiledSchema>> {
        let entity_type = definition.entity_type.trim();
        if let Some(hit) = self.get(entity_type) {
            debug!(entity_type = %entity_type, "Schema cache hit");
            return Ok(hit);
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won while we waited for the lock.
        if let Some(hit) = cache.get(entity_type) {
            debug!(entity_type = %entity_type, "Schema compiled by a concurrent writer");
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(self.compiler.compile(definition)?);
        cache.insert(entity_type.to_string(), Arc::clone(&compiled));
        info!(
            entity_type = %entity_type,
            attributes = compiled.schema.len(),
            "Registered entity type"
        );
        Ok(compiled)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(entity_type)
    }

    /// Registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
