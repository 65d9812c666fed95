//! Free-form nested documents addressed by dotted paths.
//!
//! A schemaless slot stores a JSON-encoded document. Paths like
//! `"address.city"` walk objects (and arrays, by numeric segment).

use crate::bag::AttributeSlots;
use crate::config::SchemalessConfig;
use crate::error::{ModelError, ModelResult};
use crate::schema::TransformRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct SchemalessOverlay {
    default_attribute: String,
    path_operator: String,
}

impl SchemalessOverlay {
    pub fn new(config: &SchemalessConfig) -> Self {
        Self {
            default_attribute: config.default_attribute.clone(),
            path_operator: config.path_operator.clone(),
        }
    }

    /// Decodes a slot. Absent, null and empty slots decode to `{}`.
    pub fn decode(slot: Option<&Value>) -> ModelResult<Value> {
        match slot {
            None | Some(Value::Null) => Ok(Value::Object(Map::new())),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Value::Object(Map::new())),
            Some(Value::String(s)) => Ok(serde_json::from_str(s)?),
            Some(other) => Ok(other.clone()),
        }
    }

    pub fn encode(document: &Value) -> ModelResult<Value> {
        Ok(Value::String(serde_json::to_string(document)?))
    }

    fn guard(registry: &TransformRegistry, attribute: &str) -> ModelResult<()> {
        if registry.is_schemaless(attribute) {
            Ok(())
        } else {
            Err(ModelError::validation(attribute, "not a schemaless attribute"))
        }
    }

    /// The whole decoded document.
    pub fn document(
        &self,
        slots: &impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
    ) -> ModelResult<Value> {
        Self::guard(registry, attribute)?;
        Self::decode(slots.read_slot(attribute)?.as_ref())
    }

    pub fn get(
        &self,
        slots: &impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        path: &str,
    ) -> ModelResult<Option<Value>> {
        let document = self.document(slots, registry, attribute)?;
        Ok(lookup(&document, path).cloned())
    }

    /// Writes `value` at `path`, creating intermediate objects as needed.
    pub fn set(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        path: &str,
        value: Value,
    ) -> ModelResult<()> {
        let mut document = self.document(slots, registry, attribute)?;
        assign(&mut document, path, value).map_err(|reason| ModelError::validation(attribute, reason))?;
        slots.write_slot(attribute, Self::encode(&document)?)
    }

    /// Removes the value at `path`, if any.
    pub fn forget(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        path: &str,
    ) -> ModelResult<()> {
        let mut document = self.document(slots, registry, attribute)?;
        if !remove(&mut document, path) {
            return Ok(());
        }
        slots.write_slot(attribute, Self::encode(&document)?)
    }

    /// Inserts null for every schemaless attribute missing from `attributes`.
    pub fn fill_missing(&self, registry: &TransformRegistry, attributes: &mut Map<String, Value>) {
        for name in &registry.schemaless {
            attributes.entry(name.clone()).or_insert(Value::Null);
        }
    }

    /// Query builder over the entity type's first schemaless attribute, or
    /// the configured default.
    pub fn query(&self, registry: &TransformRegistry) -> JsonQuery {
        let attribute = registry
            .schemaless
            .first()
            .cloned()
            .unwrap_or_else(|| self.default_attribute.clone());
        JsonQuery {
            attribute,
            operator: self.path_operator.clone(),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(document, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn assign(document: &mut Value, path: &str, value: Value) -> Result<(), String> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err("empty path".to_string());
    };

    let mut node = document;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Some(map) = node.as_object_mut() else {
            return Err(format!("cannot descend into \"{segment}\""));
        };
        node = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Some(map) = node.as_object_mut() {
        map.insert((*last).to_string(), value);
    }
    Ok(())
}

fn remove(document: &mut Value, path: &str) -> bool {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };

    let mut node = document;
    for segment in parents {
        let Some(child) = node.as_object_mut().and_then(|map| map.get_mut(*segment)) else {
            return false;
        };
        node = child;
    }
    node.as_object_mut()
        .is_some_and(|map| map.remove(*last).is_some())
}

/// A storage-level predicate produced by [`JsonQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// `column IS NOT NULL`
    NotNull { column: String },
    /// `column = value`
    Equals { column: String, value: Value },
}

/// Rewrites dotted document paths into the storage layer's nested-access
/// syntax, e.g. `meta.author` on `json_data` → `json_data->meta->author`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonQuery {
    attribute: String,
    operator: String,
}

impl JsonQuery {
    /// Targets another document attribute.
    pub fn on(mut self, attribute: &str) -> Self {
        self.attribute = attribute.to_string();
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The storage column expression for `path`.
    pub fn column(&self, path: &str) -> String {
        let mut column = self.attribute.clone();
        for segment in segments(path) {
            column.push_str(&self.operator);
            column.push_str(segment);
        }
        column
    }

    /// The document attribute is set at all.
    pub fn exists(&self) -> Vec<Predicate> {
        vec![Predicate::NotNull {
            column: self.attribute.clone(),
        }]
    }

    pub fn where_path(&self, path: &str, value: Value) -> Vec<Predicate> {
        vec![Predicate::Equals {
            column: self.column(path),
            value,
        }]
    }

    /// One equality per entry, conjoined.
    pub fn matching(&self, conditions: &Map<String, Value>) -> Vec<Predicate> {
        conditions
            .iter()
            .map(|(path, value)| Predicate::Equals {
                column: self.column(path),
                value: value.clone(),
            })
            .collect()
    }

    /// Positional form: no arguments is [`exists`](Self::exists); one must be
    /// a condition map; two are `(path, value)`; three or more are
    /// `(attribute, path, value)` with extras ignored.
    pub fn from_args(&self, args: &[Value]) -> ModelResult<Vec<Predicate>> {
        match args {
            [] => Ok(self.exists()),
            [Value::Object(conditions)] => Ok(self.matching(conditions)),
            [other] => Err(ModelError::validation(
                &self.attribute,
                format!("a map of conditions is expected, got {other}"),
            )),
            [path, value] => Ok(self.where_path(self.path_arg(path)?, value.clone())),
            [attribute, path, value, ..] => {
                let attribute = self.path_arg(attribute)?;
                let scoped = self.clone().on(attribute);
                Ok(scoped.where_path(self.path_arg(path)?, value.clone()))
            }
        }
    }

    fn path_arg<'a>(&self, arg: &'a Value) -> ModelResult<&'a str> {
        arg.as_str()
            .ok_or_else(|| ModelError::validation(&self.attribute, format!("expected a path string, got {arg}")))
    }
}
