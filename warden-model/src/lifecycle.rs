//! Lifecycle hooks run before an entity is persisted.
//!
//! Both hooks work on a plaintext, decoded copy of the attributes: resolve,
//! merge, check transitions, and only then write the changed values back
//! through the entity's governed write path. Translatable attributes appear
//! in the copy as locale maps and schemaless ones as documents. A validation
//! or transition failure leaves the entity untouched.

use crate::bag::AttributeSlots;
use crate::defaults::IdGenerator;
use crate::entity::Entity;
use crate::error::ModelResult;
use crate::resolver::AttributeResolver;
use crate::schema::TransformRegistry;
use crate::schemaless::SchemalessOverlay;
use crate::states::StateGuard;
use crate::translations::TranslationStore;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Creating,
    Updating,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => write!(f, "creating"),
            Self::Updating => write!(f, "updating"),
        }
    }
}

/// What a hook did to the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub event: LifecycleEvent,
    /// Deprecated attributes in use.
    pub deprecated: Vec<String>,
    /// Attributes whose stored value was rewritten, in write order.
    pub written: Vec<String>,
}

pub struct LifecycleDispatcher {
    resolver: AttributeResolver,
    guard: StateGuard,
    ids: Arc<dyn IdGenerator>,
}

impl LifecycleDispatcher {
    pub fn new(resolver: AttributeResolver, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            resolver,
            guard: StateGuard,
            ids,
        }
    }

    pub fn guard(&self) -> &StateGuard {
        &self.guard
    }

    /// Runs before the first insert. Assigns a generated primary key when the
    /// entity type uses UUID keys and none is set.
    pub fn creating(&self, entity: &mut Entity) -> ModelResult<ResolveReport> {
        self.dispatch(LifecycleEvent::Creating, entity)
    }

    /// Runs before an update of a persisted entity.
    pub fn updating(&self, entity: &mut Entity) -> ModelResult<ResolveReport> {
        self.dispatch(LifecycleEvent::Updating, entity)
    }

    fn dispatch(&self, event: LifecycleEvent, entity: &mut Entity) -> ModelResult<ResolveReport> {
        let compiled = Arc::clone(entity.schema());
        let current = decoded(&compiled.transforms, entity.plaintext_attributes()?)?;
        let mut merged = current.clone();

        if event == LifecycleEvent::Creating && compiled.uuid_primary_key {
            let key = &compiled.primary_key;
            if merged.get(key).is_none_or(Value::is_null) {
                merged.insert(key.clone(), Value::String(self.ids.generate()));
            }
        }

        let resolution = self.resolver.resolve(&merged, &compiled.schema)?;
        resolution.merge_into(&mut merged);

        let original = decoded(&compiled.transforms, entity.plaintext_original()?)?;
        self.guard.check(&compiled, &original, &merged)?;

        let changed: Map<String, Value> = merged
            .into_iter()
            .filter(|(name, value)| current.get(name) != Some(value))
            .collect();

        let mut written = Vec::with_capacity(changed.len());
        for (name, value) in changed {
            if compiled.transforms.is_translatable(&name) {
                entity.set(&name, value)?;
            } else if compiled.transforms.is_schemaless(&name) && !value.is_null() {
                entity.write_slot(&name, SchemalessOverlay::encode(&value)?)?;
            } else {
                entity.write_slot(&name, value)?;
            }
            written.push(name);
        }

        debug!(
            entity_type = %compiled.entity_type(),
            event = %event,
            written = written.len(),
            "Resolved attributes"
        );
        if !resolution.deprecated.is_empty() {
            info!(
                entity_type = %compiled.entity_type(),
                deprecated = ?resolution.deprecated,
                "Entity uses deprecated attributes"
            );
        }

        Ok(ResolveReport {
            event,
            deprecated: resolution.deprecated,
            written,
        })
    }
}

/// Decodes the non-null translatable and schemaless slots of `attributes`.
fn decoded(registry: &TransformRegistry, mut attributes: Map<String, Value>) -> ModelResult<Map<String, Value>> {
    for (name, value) in attributes.iter_mut() {
        if value.is_null() {
            continue;
        }
        if registry.is_translatable(name) {
            let translations = TranslationStore::decode(Some(&*value))?;
            *value = Value::Object(
                translations
                    .into_iter()
                    .map(|(locale, text)| (locale, Value::String(text)))
                    .collect(),
            );
        } else if registry.is_schemaless(name) {
            *value = SchemalessOverlay::decode(Some(&*value))?;
        }
    }
    Ok(attributes)
}
