//! The per-instance attribute bag and the slot-access seam used by the
//! translation store and the schemaless overlay.

use crate::error::ModelResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read/write access to whole attribute slots.
///
/// [`Entity`](crate::Entity) implements this with decryption on read and the
/// transform pipeline on write. The bare [`EntityAttributeBag`] implements it
/// with no transforms at all.
pub trait AttributeSlots {
    fn read_slot(&self, name: &str) -> ModelResult<Option<Value>>;

    fn write_slot(&mut self, name: &str, value: Value) -> ModelResult<()>;
}

/// Stored attribute values of one entity instance, plus the snapshot taken
/// at load or last persist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAttributeBag {
    attributes: Map<String, Value>,
    original: Map<String, Value>,
}

impl EntityAttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bag loaded from storage: the stored values are also the snapshot.
    pub fn from_stored(attributes: Map<String, Value>) -> Self {
        Self {
            original: attributes.clone(),
            attributes,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn original(&self) -> &Map<String, Value> {
        &self.original
    }

    pub fn original_value(&self, name: &str) -> Option<&Value> {
        self.original.get(name)
    }

    /// Refreshes the snapshot after a successful persist.
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.attributes.get(name) != self.original.get(name)
    }

    /// Attributes whose stored value differs from the snapshot.
    pub fn changes(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(name, value)| self.original.get(name.as_str()) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl AttributeSlots for EntityAttributeBag {
    fn read_slot(&self, name: &str) -> ModelResult<Option<Value>> {
        Ok(self.attributes.get(name).cloned())
    }

    fn write_slot(&mut self, name: &str, value: Value) -> ModelResult<()> {
        self.insert(name, value);
        Ok(())
    }
}
