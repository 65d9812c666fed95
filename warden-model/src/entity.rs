//! A governed entity instance.
//!
//! All access to the attribute bag goes through here. Writes are routed
//! through the translation store and then the transform pipeline. Reads
//! decrypt.

use crate::bag::{AttributeSlots, EntityAttributeBag};
use crate::error::ModelResult;
use crate::schema::CompiledSchema;
use crate::schemaless::{JsonQuery, SchemalessOverlay};
use crate::transform::TransformPipeline;
use crate::translations::{TranslationStore, Translations};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Services shared by every entity an engine produces.
pub struct EntityServices {
    pub transforms: TransformPipeline,
    pub translations: TranslationStore,
    pub schemaless: SchemalessOverlay,
}

pub struct Entity {
    compiled: Arc<CompiledSchema>,
    services: Arc<EntityServices>,
    bag: EntityAttributeBag,
}

impl Entity {
    /// A fresh, empty instance.
    pub fn new(compiled: Arc<CompiledSchema>, services: Arc<EntityServices>) -> Self {
        Self {
            compiled,
            services,
            bag: EntityAttributeBag::new(),
        }
    }

    /// An instance loaded from storage. `stored` holds values exactly as
    /// persisted (ciphertexts and digests included).
    pub fn from_stored(
        compiled: Arc<CompiledSchema>,
        services: Arc<EntityServices>,
        stored: Map<String, Value>,
    ) -> Self {
        Self {
            compiled,
            services,
            bag: EntityAttributeBag::from_stored(stored),
        }
    }

    pub fn entity_type(&self) -> &str {
        self.compiled.entity_type()
    }

    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.compiled
    }

    /// The stored representation, for the persistence layer.
    pub fn bag(&self) -> &EntityAttributeBag {
        &self.bag
    }

    /// The primary key value, if set.
    pub fn key(&self) -> Option<&Value> {
        self.bag.get(&self.compiled.primary_key)
    }

    /// Reads one attribute, decrypting if needed.
    pub fn get(&self, name: &str) -> ModelResult<Option<Value>> {
        self.bag
            .get(name)
            .map(|stored| self.services.transforms.on_read(&self.compiled.transforms, name, stored))
            .transpose()
    }

    /// Writes one attribute. Translatable attributes are routed to the
    /// translation store first; the stored value is hashed/encrypted as the
    /// attribute's behaviours require.
    pub fn set(&mut self, name: &str, value: Value) -> ModelResult<()> {
        if self.compiled.transforms.is_translatable(name) {
            let services = Arc::clone(&self.services);
            let compiled = Arc::clone(&self.compiled);
            return services.translations.route(self, &compiled.transforms, name, value);
        }
        self.write_slot(name, value)
    }

    /// Mass assignment: writes the fillable attributes of `attributes` and
    /// returns the names that were skipped.
    pub fn fill(&mut self, attributes: Map<String, Value>) -> ModelResult<Vec<String>> {
        let mut skipped = Vec::new();
        for (name, value) in attributes {
            if self.compiled.transforms.is_fillable(&name) {
                self.set(&name, value)?;
            } else {
                debug!(entity_type = %self.entity_type(), attribute = %name, "Skipped non-fillable attribute");
                skipped.push(name);
            }
        }
        Ok(skipped)
    }

    /// Every attribute, decrypted, with each schemaless attribute guaranteed
    /// present (null when never set).
    pub fn attributes(&self) -> ModelResult<Map<String, Value>> {
        let mut attributes = self.plaintext_attributes()?;
        self.services
            .schemaless
            .fill_missing(&self.compiled.transforms, &mut attributes);
        Ok(attributes)
    }

    pub(crate) fn plaintext_attributes(&self) -> ModelResult<Map<String, Value>> {
        self.decrypt_all(self.bag.attributes())
    }

    pub(crate) fn plaintext_original(&self) -> ModelResult<Map<String, Value>> {
        self.decrypt_all(self.bag.original())
    }

    fn decrypt_all(&self, stored: &Map<String, Value>) -> ModelResult<Map<String, Value>> {
        stored
            .iter()
            .map(|(name, value)| {
                let plain = self.services.transforms.on_read(&self.compiled.transforms, name, value)?;
                Ok((name.clone(), plain))
            })
            .collect()
    }

    /// Compares `candidate` with the stored digest of a hashed attribute.
    /// False when the attribute is not hashed or not set.
    pub fn check_hash(&self, name: &str, candidate: &str) -> bool {
        self.compiled.transforms.is_hashed(name)
            && self.services.transforms.hashing.check(self.bag.get(name), candidate)
    }

    // ── Translations ─────────────────────────────────────────────

    pub fn get_translations(&self, name: &str) -> ModelResult<Translations> {
        self.services.translations.get_translations(self, name)
    }

    pub fn get_translation(&self, name: &str, locale: Option<&str>) -> ModelResult<Option<String>> {
        self.services.translations.get_translation(self, name, locale)
    }

    pub fn has_translation(&self, name: &str, locale: Option<&str>) -> ModelResult<bool> {
        self.services.translations.has_translation(self, name, locale)
    }

    pub fn translate(&self, name: &str, locale: Option<&str>) -> ModelResult<String> {
        self.services.translations.translate(self, name, locale)
    }

    pub fn set_translation(&mut self, name: &str, value: &str, locale: Option<&str>) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .translations
            .set_translation(self, &compiled.transforms, name, value, locale)
    }

    pub fn set_translations(&mut self, name: &str, translations: Translations) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .translations
            .set_translations(self, &compiled.transforms, name, translations)
    }

    pub fn forget_translation(&mut self, name: &str, locale: Option<&str>) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .translations
            .forget_translation(self, &compiled.transforms, name, locale)
    }

    pub fn forget_translations(&mut self, name: &str, locales: &[&str]) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .translations
            .forget_translations(self, &compiled.transforms, name, locales)
    }

    // ── Schemaless documents ─────────────────────────────────────

    pub fn json_document(&self, name: &str) -> ModelResult<Value> {
        self.services
            .schemaless
            .document(self, &self.compiled.transforms, name)
    }

    pub fn json_get(&self, name: &str, path: &str) -> ModelResult<Option<Value>> {
        self.services
            .schemaless
            .get(self, &self.compiled.transforms, name, path)
    }

    pub fn json_set(&mut self, name: &str, path: &str, value: Value) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .schemaless
            .set(self, &compiled.transforms, name, path, value)
    }

    pub fn json_forget(&mut self, name: &str, path: &str) -> ModelResult<()> {
        let (services, compiled) = self.shared();
        services
            .schemaless
            .forget(self, &compiled.transforms, name, path)
    }

    /// Query builder over this entity type's document attribute.
    pub fn json_query(&self) -> JsonQuery {
        self.services.schemaless.query(&self.compiled.transforms)
    }

    // ── Persistence bookkeeping ──────────────────────────────────

    /// Refreshes the original snapshot after the host persisted the entity.
    pub fn mark_persisted(&mut self) {
        self.bag.sync_original();
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.bag.is_dirty(name)
    }

    /// Stored values that differ from the original snapshot.
    pub fn changes(&self) -> Map<String, Value> {
        self.bag.changes()
    }

    fn shared(&self) -> (Arc<EntityServices>, Arc<CompiledSchema>) {
        (Arc::clone(&self.services), Arc::clone(&self.compiled))
    }
}

impl AttributeSlots for Entity {
    fn read_slot(&self, name: &str) -> ModelResult<Option<Value>> {
        self.get(name)
    }

    /// The transform step runs before the bag is touched, so a cipher or
    /// hashing failure leaves the previous value in place.
    fn write_slot(&mut self, name: &str, value: Value) -> ModelResult<()> {
        let stored = self
            .services
            .transforms
            .on_write(&self.compiled.transforms, name, value)?;
        self.bag.insert(name, stored);
        Ok(())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("entity_type", &self.entity_type())
            .field("bag", &self.bag)
            .finish()
    }
}
