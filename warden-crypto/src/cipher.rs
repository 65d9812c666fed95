//! ChaCha20-Poly1305 sealing of strings into printable tokens.
//!
//! A token is `base64(nonce || ciphertext || tag)`, so it can live in a text
//! attribute slot next to a marker prefix.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &SecretKey, plaintext: &str) -> CryptoResult<String> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    token.extend_from_slice(&nonce_bytes);
    token.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(token))
}

/// Reverses [`seal`].
pub fn open(key: &SecretKey, token: &str) -> CryptoResult<String> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;

    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption("token too short".to_string()));
    }

    let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
