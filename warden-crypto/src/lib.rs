//! Cryptographic collaborators for the warden attribute engine.
//!
//! The engine never touches key material or algorithm parameters directly.
//! It talks to two narrow contracts:
//! - [`CipherProvider`]: symmetric, reversible `encrypt`/`decrypt` of strings
//! - [`HashingPrimitive`]: one-way `hash` plus `verify`
//!
//! [`ChaChaCipher`] (ChaCha20-Poly1305 over a [`SecretKey`]) and
//! [`Argon2Hasher`] (Argon2id PHC strings) are the shipped implementations.

mod cipher;
mod error;
mod hasher;
mod key;
mod provider;

pub use cipher::{open, seal, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use hasher::{Argon2Hasher, HashingPrimitive};
pub use key::{derive_key, generate_key, Argon2Params, Salt, SecretKey, KEY_SIZE, SALT_SIZE};
pub use provider::{ChaChaCipher, CipherProvider, PassthroughCipher};
