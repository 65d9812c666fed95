//! Transparent value transforms applied on attribute write and read.
//!
//! - [`EncryptionTransform`]: reversible; marks ciphertexts with a prefix
//!   so wrapping is idempotent.
//! - [`HashingTransform`]: one-way; verified with the primitive's own check.

use crate::error::ModelResult;
use crate::schema::TransformRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use warden_crypto::{CipherProvider, CryptoError, HashingPrimitive};

pub struct EncryptionTransform {
    cipher: Option<Arc<dyn CipherProvider>>,
    prefix: String,
}

impl EncryptionTransform {
    pub fn new(cipher: Arc<dyn CipherProvider>, prefix: &str) -> Self {
        Self {
            cipher: Some(cipher),
            prefix: prefix.to_string(),
        }
    }

    /// A transform with no key behind it. Reads of plaintext still work;
    /// every cipher call fails with [`CryptoError::Unavailable`].
    pub fn unkeyed(prefix: &str) -> Self {
        Self {
            cipher: None,
            prefix: prefix.to_string(),
        }
    }

    pub fn is_keyed(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `value` carries the ciphertext marker.
    pub fn is_encrypted(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| s.starts_with(&self.prefix))
    }

    fn cipher(&self) -> Result<&dyn CipherProvider, CryptoError> {
        self.cipher.as_deref().ok_or(CryptoError::Unavailable)
    }

    /// Encrypts `value` unless it is null or already encrypted.
    ///
    /// Every value is serialized to canonical JSON first, so strings and
    /// structured values decrypt back to exactly what was written.
    pub fn encrypt(&self, attribute: &str, value: &Value) -> ModelResult<Value> {
        if value.is_null() || self.is_encrypted(value) {
            return Ok(value.clone());
        }
        let plaintext = serde_json::to_string(value)?;
        let ciphertext = self.cipher()?.encrypt(&plaintext)?;
        debug!(attribute = %attribute, "Encrypted attribute");
        Ok(Value::String(format!("{}{}", self.prefix, ciphertext)))
    }

    /// Decrypts `value` if it carries the marker; returns it unchanged otherwise.
    pub fn decrypt(&self, attribute: &str, value: &Value) -> ModelResult<Value> {
        let Some(token) = value.as_str().and_then(|s| s.strip_prefix(self.prefix.as_str())) else {
            return Ok(value.clone());
        };
        let plaintext = self.cipher()?.decrypt(token)?;
        debug!(attribute = %attribute, "Decrypted attribute");
        Ok(decode_plaintext(plaintext))
    }
}

/// A plaintext that survives a structured decode/encode round trip unchanged
/// is returned structured; anything else stays a raw string.
fn decode_plaintext(plaintext: String) -> Value {
    match serde_json::from_str::<Value>(&plaintext) {
        Ok(decoded) if serde_json::to_string(&decoded).is_ok_and(|s| s == plaintext) => decoded,
        _ => Value::String(plaintext),
    }
}

pub struct HashingTransform {
    primitive: Arc<dyn HashingPrimitive>,
}

impl HashingTransform {
    pub fn new(primitive: Arc<dyn HashingPrimitive>) -> Self {
        Self { primitive }
    }

    /// Hashes `value` unless it is null or already a digest of this primitive.
    /// Non-string values are hashed in their JSON form.
    pub fn hash(&self, attribute: &str, value: &Value) -> ModelResult<Value> {
        let plaintext = match value {
            Value::Null => return Ok(Value::Null),
            Value::String(s) if self.primitive.is_digest(s) => return Ok(value.clone()),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let digest = self.primitive.hash(&plaintext)?;
        debug!(attribute = %attribute, "Hashed attribute");
        Ok(Value::String(digest))
    }

    /// Compares `candidate` with a stored digest. Never raises; an absent or
    /// non-string digest never matches.
    pub fn check(&self, stored: Option<&Value>, candidate: &str) -> bool {
        stored
            .and_then(Value::as_str)
            .is_some_and(|digest| self.primitive.verify(candidate, digest))
    }
}

/// Both transforms, dispatched by the attribute's behaviours.
pub struct TransformPipeline {
    pub encryption: EncryptionTransform,
    pub hashing: HashingTransform,
}

impl TransformPipeline {
    pub fn new(encryption: EncryptionTransform, hashing: HashingTransform) -> Self {
        Self { encryption, hashing }
    }

    /// Write path: hash, then encrypt, for the attributes flagged so.
    pub fn on_write(&self, registry: &TransformRegistry, attribute: &str, value: Value) -> ModelResult<Value> {
        if value.is_null() {
            return Ok(value);
        }
        let mut value = value;
        if registry.is_hashed(attribute) {
            value = self.hashing.hash(attribute, &value)?;
        }
        if registry.is_encrypted(attribute) {
            value = self.encryption.encrypt(attribute, &value)?;
        }
        Ok(value)
    }

    /// Read path: decrypt encrypted attributes.
    pub fn on_read(&self, registry: &TransformRegistry, attribute: &str, value: &Value) -> ModelResult<Value> {
        if registry.is_encrypted(attribute) {
            return self.encryption.decrypt(attribute, value);
        }
        Ok(value.clone())
    }
}
