//! Declarative attribute governance for persistent entities.
//!
//! An entity type declares its attributes once, in an [`EntityDefinition`].
//! The engine compiles it into a [`CompiledSchema`] and from then on governs
//! every instance:
//! - [`AttributeResolver`]: defaults (`{{uuid}}`, `{{now}}`), type and
//!   allowed-value validation, storage casts
//! - [`StateGuard`]: declared state transitions
//! - [`TransformPipeline`]: transparent encryption and one-way hashing
//! - [`TranslationStore`] and [`SchemalessOverlay`]: locale maps and nested
//!   documents packed into a single slot
//! - [`LifecycleDispatcher`]: the `creating`/`updating` hooks
//! - [`AuditLogger`]: records for created/updated/deleted entities
//!
//! Persistence is the host's job. The engine only sees the attribute bag.

mod audit;
mod bag;
mod config;
mod defaults;
mod definition;
mod descriptor;
mod engine;
mod entity;
mod error;
mod lifecycle;
mod registry;
mod resolver;
mod schema;
mod schemaless;
mod states;
mod transform;
mod translations;

pub use audit::{AuditAction, AuditLogger, AuditRecord, AuditSink, MemoryAuditSink};
pub use bag::{AttributeSlots, EntityAttributeBag};
pub use config::{EncryptionConfig, EngineConfig, LocaleConfig, SchemalessConfig};
pub use defaults::{Clock, DefaultResolvers, IdGenerator, SystemClock, UuidGenerator};
pub use definition::{AttributeDecl, Behavior, EntityDefinition, TypeSpec};
pub use descriptor::{AttributeDescriptor, DefaultExpr};
pub use engine::{Engine, EngineBuilder};
pub use entity::{Entity, EntityServices};
pub use error::{ModelError, ModelResult};
pub use lifecycle::{LifecycleDispatcher, LifecycleEvent, ResolveReport};
pub use registry::SchemaRegistry;
pub use resolver::{AttributeResolver, Resolution};
pub use schema::{AttributeSchema, CompiledSchema, SchemaCompiler, TransformRegistry};
pub use schemaless::{JsonQuery, Predicate, SchemalessOverlay};
pub use states::{state_key, StateGuard, TransitionMap, NONE_STATE};
pub use transform::{EncryptionTransform, HashingTransform, TransformPipeline};
pub use translations::{ConfiguredLocale, LocaleProvider, TranslationStore, Translations};
