//! The engine: one place that owns the registry, the shared services and
//! the lifecycle hooks.

use crate::audit::{AuditAction, AuditLogger, AuditRecord, AuditSink, MemoryAuditSink};
use crate::config::EngineConfig;
use crate::defaults::{Clock, DefaultResolvers, IdGenerator, SystemClock, UuidGenerator};
use crate::definition::{Behavior, EntityDefinition};
use crate::entity::{Entity, EntityServices};
use crate::error::{ModelError, ModelResult};
use crate::lifecycle::{LifecycleDispatcher, ResolveReport};
use crate::registry::SchemaRegistry;
use crate::resolver::AttributeResolver;
use crate::schema::{CompiledSchema, SchemaCompiler};
use crate::schemaless::SchemalessOverlay;
use crate::transform::{EncryptionTransform, HashingTransform, TransformPipeline};
use crate::translations::{ConfiguredLocale, LocaleProvider, TranslationStore};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use warden_crypto::{Argon2Hasher, CipherProvider, HashingPrimitive};

pub struct EngineBuilder {
    config: EngineConfig,
    cipher: Option<Arc<dyn CipherProvider>>,
    hasher: Option<Arc<dyn HashingPrimitive>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    locale: Option<Arc<dyn LocaleProvider>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    resolvers: Vec<(String, Arc<dyn Fn() -> Value + Send + Sync>)>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cipher: None,
            hasher: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            locale: None,
            audit_sink: None,
            resolvers: Vec::new(),
        }
    }

    pub fn cipher(mut self, cipher: Arc<dyn CipherProvider>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Defaults to Argon2id with the configured costs.
    pub fn hasher(mut self, hasher: Arc<dyn HashingPrimitive>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Defaults to the locales in the config.
    pub fn locale(mut self, locale: Arc<dyn LocaleProvider>) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Defaults to an in-memory sink.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Adds a `{{name}}` default resolver next to the built-in `uuid` and `now`.
    pub fn default_resolver<F>(mut self, name: &str, resolver: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.resolvers.push((name.to_string(), Arc::new(resolver)));
        self
    }

    pub fn build(self) -> ModelResult<Engine> {
        let config = self.config;
        if config.encryption.prefix.is_empty() {
            return Err(ModelError::Config("encryption prefix must not be empty".to_string()));
        }

        let mut defaults = DefaultResolvers::with_builtins(Arc::clone(&self.clock), Arc::clone(&self.ids));
        for (name, resolver) in self.resolvers {
            defaults.register(&name, move || resolver());
        }
        let defaults = Arc::new(defaults);

        let encryption = match self.cipher {
            Some(cipher) => EncryptionTransform::new(cipher, &config.encryption.prefix),
            None => EncryptionTransform::unkeyed(&config.encryption.prefix),
        };
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2Hasher::new(config.hashing.clone())));
        let locale = self
            .locale
            .unwrap_or_else(|| Arc::new(ConfiguredLocale::new(&config.locale)));
        let sink = self
            .audit_sink
            .unwrap_or_else(|| Arc::new(MemoryAuditSink::new()));

        let services = Arc::new(EntityServices {
            transforms: TransformPipeline::new(encryption, HashingTransform::new(hasher)),
            translations: TranslationStore::new(locale),
            schemaless: SchemalessOverlay::new(&config.schemaless),
        });

        Ok(Engine {
            registry: SchemaRegistry::new(SchemaCompiler::new(Arc::clone(&defaults))),
            dispatcher: LifecycleDispatcher::new(AttributeResolver::new(defaults), self.ids),
            audit: AuditLogger::new(sink, self.clock),
            services,
            config,
        })
    }
}

pub struct Engine {
    config: EngineConfig,
    registry: SchemaRegistry,
    services: Arc<EntityServices>,
    dispatcher: LifecycleDispatcher,
    audit: AuditLogger,
}

impl Engine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn services(&self) -> &Arc<EntityServices> {
        &self.services
    }

    pub fn dispatcher(&self) -> &LifecycleDispatcher {
        &self.dispatcher
    }

    /// Compiles and caches a definition. Entity types with encrypted
    /// attributes are refused when the engine has no cipher.
    pub fn register(&self, definition: &EntityDefinition) -> ModelResult<Arc<CompiledSchema>> {
        let encrypted: Vec<&str> = definition
            .attributes
            .iter()
            .filter(|(_, decl)| decl.behaviours.contains(&Behavior::Encrypted))
            .map(|(name, _)| name.as_str())
            .collect();
        if !encrypted.is_empty() && !self.services.transforms.encryption.is_keyed() {
            return Err(ModelError::Schema(format!(
                "{} declares encrypted attributes ({}) but no cipher is configured",
                definition.entity_type,
                encrypted.join(", ")
            )));
        }
        self.registry.compile(definition)
    }

    pub fn schema(&self, entity_type: &str) -> Option<Arc<CompiledSchema>> {
        self.registry.get(entity_type)
    }

    fn require(&self, entity_type: &str) -> ModelResult<Arc<CompiledSchema>> {
        self.schema(entity_type)
            .ok_or_else(|| ModelError::Schema(format!("entity type \"{entity_type}\" is not registered")))
    }

    /// A new, empty instance of a registered entity type.
    pub fn instantiate(&self, entity_type: &str) -> ModelResult<Entity> {
        Ok(Entity::new(self.require(entity_type)?, Arc::clone(&self.services)))
    }

    /// An instance rebuilt from its stored attributes.
    pub fn load(&self, entity_type: &str, stored: Map<String, Value>) -> ModelResult<Entity> {
        Ok(Entity::from_stored(
            self.require(entity_type)?,
            Arc::clone(&self.services),
            stored,
        ))
    }

    pub fn creating(&self, entity: &mut Entity) -> ModelResult<ResolveReport> {
        self.dispatcher.creating(entity)
    }

    pub fn updating(&self, entity: &mut Entity) -> ModelResult<ResolveReport> {
        self.dispatcher.updating(entity)
    }

    /// Called by the host once a write has landed: emits the audit record
    /// and, unless the entity was deleted, refreshes its original snapshot.
    pub fn persisted(
        &self,
        entity: &mut Entity,
        action: AuditAction,
        causer: Option<&str>,
    ) -> ModelResult<Option<AuditRecord>> {
        let record = self.audit.log(action, entity, causer)?;
        if action != AuditAction::Deleted {
            entity.mark_persisted();
        }
        info!(entity_type = %entity.entity_type(), action = %action, "Entity persisted");
        Ok(record)
    }
}
