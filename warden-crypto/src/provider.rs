//! The cipher-provider contract consumed by the encryption transform.
//!
//! The engine depends on `Arc<dyn CipherProvider>` and never sees keys.

use crate::cipher;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, Argon2Params, Salt, SecretKey};

/// Symmetric string cipher keyed outside the engine.
pub trait CipherProvider: Send + Sync {
    /// Encrypts a plaintext string into a printable ciphertext.
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String>;

    /// Decrypts a ciphertext previously produced by [`CipherProvider::encrypt`].
    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String>;
}

/// ChaCha20-Poly1305 provider holding one key.
#[derive(Debug, Clone)]
pub struct ChaChaCipher {
    key: SecretKey,
}

impl ChaChaCipher {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    /// Builds a provider whose key is derived from a passphrase.
    pub fn from_passphrase(passphrase: &str, salt: &Salt, params: &Argon2Params) -> CryptoResult<Self> {
        Ok(Self::new(derive_key(passphrase, salt, params)?))
    }
}

impl CipherProvider for ChaChaCipher {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        cipher::seal(&self.key, plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        cipher::open(&self.key, ciphertext)
    }
}

/// Identity provider for tests and unkeyed development setups.
/// An empty ciphertext is treated as a missing key.
pub struct PassthroughCipher;

impl CipherProvider for PassthroughCipher {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        if ciphertext.is_empty() {
            return Err(CryptoError::Unavailable);
        }
        Ok(ciphertext.to_string())
    }
}
