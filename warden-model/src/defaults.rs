//! Named default-value resolvers for `{{name}}` placeholders.
//!
//! The table is populated before any schema is compiled, so an unknown
//! placeholder is a [`ModelError::Schema`] at registration time rather than
//! a failure on first use.

use crate::error::{ModelError, ModelResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use warden_types::{format_datetime, RecordId};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of globally unique string identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers.
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        RecordId::new().to_string()
    }
}

type ResolverFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Lookup table from placeholder name to resolver function.
#[derive(Clone)]
pub struct DefaultResolvers {
    table: HashMap<String, ResolverFn>,
}

impl DefaultResolvers {
    /// A table with no resolvers at all.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A table with the built-in `uuid` and `now` resolvers.
    pub fn with_builtins(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let mut resolvers = Self::empty();
        resolvers.register("uuid", move || Value::String(ids.generate()));
        resolvers.register("now", move || Value::String(format_datetime(&clock.now())));
        resolvers
    }

    /// Registers (or replaces) a resolver.
    pub fn register<F>(&mut self, name: &str, resolver: F) -> &mut Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.table.insert(name.to_string(), Arc::new(resolver));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Runs the resolver registered under `name`.
    pub fn resolve(&self, name: &str) -> ModelResult<Value> {
        self.table
            .get(name)
            .map(|resolver| resolver())
            .ok_or_else(|| ModelError::Schema(format!("unknown default resolver \"{{{{{name}}}}}\"")))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DefaultResolvers {
    fn default() -> Self {
        Self::with_builtins(Arc::new(SystemClock), Arc::new(UuidGenerator))
    }
}

impl fmt::Debug for DefaultResolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResolvers")
            .field("names", &self.names())
            .finish()
    }
}
