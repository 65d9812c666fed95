//! Declarative entity definitions, as written by entity-type authors.
//!
//! A definition is plain data: it can be built in code or deserialized from
//! JSON/TOML. It is turned into a [`CompiledSchema`](crate::CompiledSchema)
//! exactly once per entity type by the [`SchemaRegistry`](crate::SchemaRegistry).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A behaviour flag controlling which pipeline stages apply to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// May be mass-assigned through [`Entity::fill`](crate::Entity::fill).
    Fillable,
    /// Must be present (or defaulted) on every resolve.
    Required,
    /// Still accepted, but every use is reported.
    Deprecated,
    /// Admits null in addition to its declared types.
    Nullable,
    /// Changes are checked against the entity type's transition map.
    #[serde(alias = "state")]
    Stateful,
    /// Stored encrypted, decrypted on read.
    Encrypted,
    /// Stored as a one-way digest.
    Hashed,
    /// Holds a locale-keyed map of strings.
    Translatable,
    /// Holds a free-form nested document.
    Schemaless,
}

/// One type name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    One(String),
    Many(Vec<String>),
}

impl Default for TypeSpec {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl TypeSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) if name.trim().is_empty() => Vec::new(),
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Declaration of a single attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDecl {
    #[serde(rename = "type")]
    pub types: TypeSpec,
    /// A literal value, or a string containing a `{{resolver}}` placeholder.
    pub default: Option<Value>,
    pub allowed: Option<Vec<Value>>,
    #[serde(alias = "behaviors")]
    pub behaviours: Vec<Behavior>,
}

impl AttributeDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a declaration admitting a single type.
    pub fn of_type(name: &str) -> Self {
        Self::new().or_type(name)
    }

    /// Adds another admitted type.
    pub fn or_type(mut self, name: &str) -> Self {
        let mut names: Vec<String> = self.types.names().into_iter().map(str::to_string).collect();
        names.push(name.to_string());
        self.types = TypeSpec::Many(names);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn allowing<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with(mut self, behavior: Behavior) -> Self {
        if !self.behaviours.contains(&behavior) {
            self.behaviours.push(behavior);
        }
        self
    }
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_true() -> bool {
    true
}

/// The full declaration of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub entity_type: String,
    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeDecl>,
    /// attribute → current value → allowed next values.
    #[serde(default)]
    pub transitions: IndexMap<String, IndexMap<String, Vec<Value>>>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Fill a missing primary key with a generated identifier on create.
    #[serde(default = "default_true")]
    pub uuid_primary_key: bool,
    /// Emit audit records for this type.
    #[serde(default = "default_true")]
    pub loggable: bool,
}

impl EntityDefinition {
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            attributes: IndexMap::new(),
            transitions: IndexMap::new(),
            primary_key: default_primary_key(),
            uuid_primary_key: true,
            loggable: true,
        }
    }

    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn attribute(mut self, name: &str, decl: AttributeDecl) -> Self {
        self.attributes.insert(name.to_string(), decl);
        self
    }

    /// Allows `attribute` to move from `from` to each of `to`.
    /// An empty `to` makes `from` terminal.
    pub fn transition<I, V>(mut self, attribute: &str, from: &str, to: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.transitions
            .entry(attribute.to_string())
            .or_default()
            .entry(from.to_string())
            .or_default()
            .extend(to.into_iter().map(Into::into));
        self
    }

    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key = name.to_string();
        self
    }

    pub fn without_uuid_primary_key(mut self) -> Self {
        self.uuid_primary_key = false;
        self
    }

    pub fn not_loggable(mut self) -> Self {
        self.loggable = false;
        self
    }
}
