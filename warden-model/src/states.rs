//! Per-attribute state machines.
//!
//! States are whatever values an attribute has held; the table only lists
//! constrained origins. An attribute missing from the table, or a current
//! state missing from its sub-table, may move anywhere.

use crate::error::{ModelError, ModelResult};
use crate::schema::CompiledSchema;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// The state of an attribute that was absent (or null) before the change.
pub const NONE_STATE: &str = "none";

/// Renders a value as a state key: strings as-is, other scalars as JSON,
/// absent or null as [`NONE_STATE`].
pub fn state_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NONE_STATE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// attribute → current state → allowed next states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionMap {
    table: HashMap<String, HashMap<String, Vec<String>>>,
}

impl TransitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_declared(declared: &IndexMap<String, IndexMap<String, Vec<Value>>>) -> Self {
        let mut map = Self::new();
        for (attribute, origins) in declared {
            for (from, targets) in origins {
                map.allow(attribute, from, targets.iter().map(|t| state_key(Some(t))));
            }
        }
        map
    }

    /// Adds allowed moves. Registering an origin with no targets makes it terminal.
    pub fn allow<I, S>(&mut self, attribute: &str, from: &str, to: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table
            .entry(attribute.to_string())
            .or_default()
            .entry(from.to_string())
            .or_default()
            .extend(to.into_iter().map(Into::into));
    }

    /// The allowed next states from `current`, or `None` when unconstrained.
    pub fn targets(&self, attribute: &str, current: &str) -> Option<&[String]> {
        self.table
            .get(attribute)
            .and_then(|origins| origins.get(current))
            .map(Vec::as_slice)
    }

    pub fn permits(&self, attribute: &str, current: &str, candidate: &str) -> bool {
        match self.targets(attribute, current) {
            None => true,
            Some(targets) => targets.iter().any(|t| t == candidate),
        }
    }

    pub fn constrains(&self, attribute: &str) -> bool {
        self.table.contains_key(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Validates stateful attribute changes against the transition map.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateGuard;

impl StateGuard {
    /// Checks every stateful attribute present in `attributes` against its
    /// value in `original`, in declaration order. Stops at the first
    /// illegal move.
    pub fn check(
        &self,
        compiled: &CompiledSchema,
        original: &Map<String, Value>,
        attributes: &Map<String, Value>,
    ) -> ModelResult<()> {
        for attribute in &compiled.transforms.stateful {
            let Some(candidate) = attributes.get(attribute) else {
                continue;
            };
            let current = state_key(original.get(attribute));
            let candidate = state_key(Some(candidate));

            if !compiled.transitions.permits(attribute, &current, &candidate) {
                return Err(ModelError::Transition {
                    attribute: attribute.clone(),
                    current,
                    candidate,
                });
            }
            debug!(attribute = %attribute, from = %current, to = %candidate, "Transition allowed");
        }
        Ok(())
    }

    /// Answers whether `attribute` may move from `current` to `candidate`
    /// without raising. Non-stateful attributes may always move.
    pub fn can_transition(
        &self,
        compiled: &CompiledSchema,
        attribute: &str,
        current: Option<&Value>,
        candidate: &Value,
    ) -> bool {
        if !compiled.transforms.is_stateful(attribute) {
            return true;
        }
        compiled
            .transitions
            .permits(attribute, &state_key(current), &state_key(Some(candidate)))
    }
}
