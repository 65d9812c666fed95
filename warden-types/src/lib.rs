//! Core type definitions for the warden attribute engine.
//!
//! This crate defines the small, schema-agnostic vocabulary shared by the
//! rest of the workspace:
//! - [`PrimitiveType`]: the value kinds an attribute may admit
//! - [`StorageCast`]: the canonical storage kinds and their pure conversions
//! - [`RecordId`]: random identifiers for records produced by the engine
//!
//! Attribute values themselves are plain [`serde_json::Value`]s.

mod cast;
mod ids;
mod kind;

pub use cast::{format_datetime, parse_datetime, StorageCast};
pub use ids::RecordId;
pub use kind::PrimitiveType;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown attribute type: {0}")]
    UnknownType(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
