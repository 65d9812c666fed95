//! The attribute resolver: defaults, validation and storage casts.

use crate::defaults::DefaultResolvers;
use crate::definition::Behavior;
use crate::descriptor::{AttributeDescriptor, DefaultExpr};
use crate::error::{ModelError, ModelResult};
use crate::schema::AttributeSchema;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

/// Outcome of one resolve pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Resolved values of every schema attribute that is present or defaulted.
    /// Attributes outside the schema are not included.
    pub attributes: Map<String, Value>,
    /// Deprecated attributes that were used, one entry each.
    pub deprecated: Vec<String>,
}

impl Resolution {
    /// Overlays the resolved values onto `bag`, leaving every other key alone.
    pub fn merge_into(&self, bag: &mut Map<String, Value>) {
        for (name, value) in &self.attributes {
            bag.insert(name.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeResolver {
    defaults: Arc<DefaultResolvers>,
}

impl AttributeResolver {
    pub fn new(defaults: Arc<DefaultResolvers>) -> Self {
        Self { defaults }
    }

    /// Resolves `raw` against `schema`. Values must be plaintext and decoded:
    /// translatable attributes as locale maps, schemaless ones as documents.
    pub fn resolve(&self, raw: &Map<String, Value>, schema: &AttributeSchema) -> ModelResult<Resolution> {
        let mut resolution = Resolution::default();

        for descriptor in schema.iter() {
            let name = descriptor.name.as_str();
            let value = match raw.get(name) {
                Some(value) => {
                    validate(descriptor, value)?;
                    value.clone()
                }
                None => match &descriptor.default {
                    Some(DefaultExpr::Literal(literal)) => literal.clone(),
                    Some(DefaultExpr::Resolver(resolver)) => self.defaults.resolve(resolver)?,
                    None if descriptor.has(Behavior::Required) => {
                        return Err(ModelError::validation(name, "required attribute is missing"));
                    }
                    None => continue,
                },
            };

            if descriptor.has(Behavior::Deprecated) {
                warn!(entity_type = %schema.entity_type(), attribute = %name, "Deprecated attribute in use");
                resolution.deprecated.push(name.to_string());
            }

            let value = match descriptor.cast {
                Some(cast) => cast.coerce(&value),
                None => value,
            };
            resolution.attributes.insert(name.to_string(), value);
        }

        Ok(resolution)
    }
}

fn validate(descriptor: &AttributeDescriptor, value: &Value) -> ModelResult<()> {
    // The plaintext of a hashed attribute is gone once written; only
    // presence can be checked.
    if descriptor.has(Behavior::Hashed) {
        return Ok(());
    }

    match descriptor.violation(value) {
        Some(reason) => Err(ModelError::validation(&descriptor.name, reason)),
        None => Ok(()),
    }
}
