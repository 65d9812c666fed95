//! Schema compilation: declarative definitions to compiled, read-only schemas.

use crate::defaults::DefaultResolvers;
use crate::definition::{AttributeDecl, Behavior, EntityDefinition};
use crate::descriptor::{AttributeDescriptor, DefaultExpr};
use crate::error::{ModelError, ModelResult};
use crate::states::TransitionMap;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_types::{PrimitiveType, StorageCast};

/// Attribute name → descriptor for one entity type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    entity_type: String,
    descriptors: IndexMap<String, AttributeDescriptor>,
}

impl AttributeSchema {
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.descriptors.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Attribute names under each behaviour that drives a pipeline stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformRegistry {
    pub fillable: Vec<String>,
    pub stateful: Vec<String>,
    pub encrypted: Vec<String>,
    pub hashed: Vec<String>,
    pub translatable: Vec<String>,
    pub schemaless: Vec<String>,
}

impl TransformRegistry {
    fn record(&mut self, name: &str, behavior: Behavior) {
        let list = match behavior {
            Behavior::Fillable => &mut self.fillable,
            Behavior::Stateful => &mut self.stateful,
            Behavior::Encrypted => &mut self.encrypted,
            Behavior::Hashed => &mut self.hashed,
            Behavior::Translatable => &mut self.translatable,
            Behavior::Schemaless => &mut self.schemaless,
            Behavior::Required | Behavior::Deprecated | Behavior::Nullable => return,
        };
        list.push(name.to_string());
    }

    pub fn is_fillable(&self, name: &str) -> bool {
        self.fillable.iter().any(|n| n == name)
    }

    pub fn is_stateful(&self, name: &str) -> bool {
        self.stateful.iter().any(|n| n == name)
    }

    pub fn is_encrypted(&self, name: &str) -> bool {
        self.encrypted.iter().any(|n| n == name)
    }

    pub fn is_hashed(&self, name: &str) -> bool {
        self.hashed.iter().any(|n| n == name)
    }

    pub fn is_translatable(&self, name: &str) -> bool {
        self.translatable.iter().any(|n| n == name)
    }

    pub fn is_schemaless(&self, name: &str) -> bool {
        self.schemaless.iter().any(|n| n == name)
    }
}

/// Everything derived from one [`EntityDefinition`]. Shared read-only by
/// every instance of the entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub schema: AttributeSchema,
    pub transforms: TransformRegistry,
    pub transitions: TransitionMap,
    pub primary_key: String,
    pub uuid_primary_key: bool,
    pub loggable: bool,
}

impl CompiledSchema {
    pub fn entity_type(&self) -> &str {
        self.schema.entity_type()
    }
}

/// Compiles definitions against a table of default resolvers.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    defaults: Arc<DefaultResolvers>,
}

impl SchemaCompiler {
    pub fn new(defaults: Arc<DefaultResolvers>) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &Arc<DefaultResolvers> {
        &self.defaults
    }

    pub fn compile(&self, definition: &EntityDefinition) -> ModelResult<CompiledSchema> {
        let entity_type = definition.entity_type.trim();
        if entity_type.is_empty() {
            return Err(ModelError::Schema("entity type name is empty".to_string()));
        }

        let mut descriptors = IndexMap::with_capacity(definition.attributes.len());
        let mut transforms = TransformRegistry::default();

        for (name, decl) in &definition.attributes {
            let descriptor = self
                .compile_attribute(name, decl)
                .map_err(|reason| ModelError::Schema(format!("{entity_type}.{name}: {reason}")))?;
            for behavior in &descriptor.behaviors {
                transforms.record(name, *behavior);
            }
            descriptors.insert(name.clone(), descriptor);
        }

        for attribute in definition.transitions.keys() {
            if !transforms.is_stateful(attribute) {
                warn!(
                    entity_type = %entity_type,
                    attribute = %attribute,
                    "Transitions declared for an attribute without the stateful behaviour; they are ignored"
                );
            }
        }

        debug!(entity_type = %entity_type, attributes = descriptors.len(), "Compiled attribute schema");

        Ok(CompiledSchema {
            schema: AttributeSchema {
                entity_type: entity_type.to_string(),
                descriptors,
            },
            transforms,
            transitions: TransitionMap::from_declared(&definition.transitions),
            primary_key: definition.primary_key.clone(),
            uuid_primary_key: definition.uuid_primary_key,
            loggable: definition.loggable,
        })
    }

    fn compile_attribute(&self, name: &str, decl: &AttributeDecl) -> Result<AttributeDescriptor, String> {
        let behaviors: BTreeSet<Behavior> = decl.behaviours.iter().copied().collect();

        if behaviors.contains(&Behavior::Encrypted) && behaviors.contains(&Behavior::Hashed) {
            return Err("an attribute cannot be both encrypted and hashed".to_string());
        }

        let mut allowed_types = Vec::new();
        for type_name in decl.types.names() {
            let kind: PrimitiveType = type_name.parse().map_err(|e: warden_types::Error| e.to_string())?;
            if !allowed_types.contains(&kind) {
                allowed_types.push(kind);
            }
        }
        if behaviors.contains(&Behavior::Nullable) && !allowed_types.contains(&PrimitiveType::Null) {
            allowed_types.push(PrimitiveType::Null);
        }

        if let Some(values) = &decl.allowed {
            if behaviors.contains(&Behavior::Hashed) {
                return Err("allowed values cannot be enforced on a hashed attribute".to_string());
            }
            check_allowed_values(&allowed_types, values)?;
        }

        let default = match &decl.default {
            None => None,
            Some(value) => Some(self.compile_default(value)?),
        };

        // Translatable and schemaless slots hold an encoded document; a cast
        // would rewrite it.
        let cast = if behaviors.contains(&Behavior::Translatable) || behaviors.contains(&Behavior::Schemaless) {
            None
        } else {
            StorageCast::first_supported(&allowed_types)
        };

        let descriptor = AttributeDescriptor {
            name: name.to_string(),
            cast,
            allowed_types,
            allowed_values: decl.allowed.clone(),
            default,
            behaviors,
        };

        if let Some(DefaultExpr::Literal(literal)) = &descriptor.default {
            if let Some(reason) = descriptor.violation(literal) {
                return Err(format!("default {literal} violates the declared constraints: {reason}"));
            }
        }

        Ok(descriptor)
    }

    fn compile_default(&self, value: &Value) -> Result<DefaultExpr, String> {
        match DefaultExpr::parse(value) {
            None => Err(format!("malformed default placeholder {value}")),
            Some(DefaultExpr::Resolver(name)) if !self.defaults.contains(&name) => Err(format!(
                "unknown default resolver \"{name}\" (registered: {})",
                self.defaults.names().join(", ")
            )),
            Some(expr) => Ok(expr),
        }
    }
}

/// Allowed values must satisfy the declared types. With no declared types
/// they must at least share one runtime kind (null aside).
fn check_allowed_values(types: &[PrimitiveType], values: &[Value]) -> Result<(), String> {
    if types.is_empty() {
        let kinds: BTreeSet<&str> = values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match PrimitiveType::describe(v) {
                "integer" | "float" => "number",
                other => other,
            })
            .collect();
        if kinds.len() > 1 {
            return Err(format!(
                "allowed values mix kinds ({}) and no type is declared",
                kinds.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
        return Ok(());
    }

    match values.iter().find(|v| !types.iter().any(|t| t.matches(v))) {
        Some(stray) => Err(format!("allowed value {stray} is not of a declared type")),
        None => Ok(()),
    }
}
