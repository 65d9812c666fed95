//! Error types for the crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by cipher and hashing backends.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key, tampered or truncated token).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Hashing failed (invalid parameters).
    #[error("hashing failed: {0}")]
    Hashing(String),

    /// No key is loaded into the provider.
    #[error("cipher unavailable (no key loaded)")]
    Unavailable,
}
