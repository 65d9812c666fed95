//! Compiled, immutable attribute descriptors.

use crate::definition::Behavior;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use warden_types::{PrimitiveType, StorageCast};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// How a missing attribute gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExpr {
    Literal(Value),
    /// Name of a registered default resolver.
    Resolver(String),
}

impl DefaultExpr {
    /// Classifies a declared default. Returns `None` for a string that opens
    /// a placeholder (`{{`) without naming a resolver.
    pub fn parse(value: &Value) -> Option<Self> {
        let Some(text) = value.as_str().filter(|s| s.contains("{{")) else {
            return Some(Self::Literal(value.clone()));
        };
        PLACEHOLDER
            .captures(text)
            .map(|caps| Self::Resolver(caps[1].to_string()))
    }
}

/// One compiled attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub name: String,
    /// Empty means any type is admitted.
    pub allowed_types: Vec<PrimitiveType>,
    pub allowed_values: Option<Vec<Value>>,
    pub default: Option<DefaultExpr>,
    pub behaviors: BTreeSet<Behavior>,
    pub cast: Option<StorageCast>,
}

impl AttributeDescriptor {
    pub fn has(&self, behavior: Behavior) -> bool {
        self.behaviors.contains(&behavior)
    }

    pub fn admits_null(&self) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.contains(&PrimitiveType::Null)
    }

    /// Returns true if the runtime type of `value` is admitted.
    pub fn accepts_type(&self, value: &Value) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t.matches(value))
    }

    /// Returns true if `value` is in the allowed set (or no set is declared).
    /// Null is exempt when the attribute admits null.
    pub fn accepts_value(&self, value: &Value) -> bool {
        match &self.allowed_values {
            None => true,
            Some(_) if value.is_null() && self.admits_null() => true,
            Some(values) => values.contains(value),
        }
    }

    /// Checks a decoded value against the declared types and allowed values.
    /// A translatable attribute given a locale map is checked entry by entry.
    /// Returns the reason of the first violation.
    pub fn violation(&self, value: &Value) -> Option<String> {
        match value {
            Value::Object(entries) if self.has(Behavior::Translatable) => entries
                .iter()
                .find_map(|(locale, entry)| {
                    self.entry_violation(entry)
                        .map(|reason| format!("translation \"{locale}\": {reason}"))
                }),
            _ => self.entry_violation(value),
        }
    }

    fn entry_violation(&self, value: &Value) -> Option<String> {
        if !self.accepts_type(value) {
            return Some(format!(
                "expected one of [{}], got {}",
                self.type_list(),
                PrimitiveType::describe(value)
            ));
        }
        if !self.accepts_value(value) {
            let allowed = self
                .allowed_values
                .iter()
                .flatten()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Some(format!("value {value} is not one of [{allowed}]"));
        }
        None
    }

    /// Human-readable list of admitted types.
    pub fn type_list(&self) -> String {
        self.allowed_types
            .iter()
            .map(PrimitiveType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
