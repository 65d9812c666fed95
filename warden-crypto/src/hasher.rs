//! One-way hashing of attribute values.

use crate::error::{CryptoError, CryptoResult};
use crate::key::Argon2Params;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// One-way hashing primitive with its own verification.
pub trait HashingPrimitive: Send + Sync {
    /// Hashes `plaintext` into a self-describing digest.
    fn hash(&self, plaintext: &str) -> CryptoResult<String>;

    /// Returns true if `candidate` hashes to `digest`. Never errors.
    fn verify(&self, candidate: &str, digest: &str) -> bool;

    /// Returns true if `value` is a digest this primitive produced.
    fn is_digest(&self, value: &str) -> bool;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$m=...`).
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Argon2Params,
}

impl Argon2Hasher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }
}

impl HashingPrimitive for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let digest = self
            .params
            .build(None)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(digest.to_string())
    }

    fn verify(&self, candidate: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        // Cost parameters are read back from the digest itself.
        argon2::Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    fn is_digest(&self, value: &str) -> bool {
        PasswordHash::new(value).is_ok_and(|h| h.algorithm.as_str().starts_with("argon2"))
    }
}
