//! Error types for the governance engine.

use thiserror::Error;
use warden_crypto::CryptoError;

/// Result type for engine operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while compiling schemas or governing attribute mutation.
///
/// Every error is local to one resolution/transition pass and nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed or unresolvable schema declaration.
    #[error("schema error: {0}")]
    Schema(String),

    /// A value violates its type, allowed-value or required constraint,
    /// or a schemaless query argument is malformed.
    #[error("validation failed on \"{attribute}\": {reason}")]
    Validation { attribute: String, reason: String },

    /// Illegal state transition on a stateful attribute.
    #[error("transition from \"{current}\" to \"{candidate}\" not allowed on attribute \"{attribute}\"")]
    Transition {
        attribute: String,
        current: String,
        candidate: String,
    },

    /// Cipher or hashing backend failure.
    #[error("transform error: {0}")]
    Transform(#[from] CryptoError),

    /// Translation mutation on an attribute without the translatable behaviour.
    #[error("{0} is not a translatable attribute")]
    NotTranslatable(String),

    /// A translation or schemaless slot holds malformed JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl ModelError {
    pub(crate) fn validation(attribute: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}
