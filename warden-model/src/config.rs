//! Engine configuration, read from `warden.toml`.
//!
//! Every key is optional; an empty file yields [`EngineConfig::default`].

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use warden_crypto::Argon2Params;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub encryption: EncryptionConfig,
    /// Argon2id costs for hashed attributes.
    pub hashing: Argon2Params,
    pub locale: LocaleConfig,
    pub schemaless: SchemalessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Marker prepended to every ciphertext so encrypted values are recognizable.
    pub prefix: String,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            prefix: "__ENCRYPTED__".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub active: String,
    pub fallback: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            active: "en".to_string(),
            fallback: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemalessConfig {
    /// Document attribute used by queries when an entity type declares none.
    pub default_attribute: String,
    /// The storage layer's nested-access operator.
    pub path_operator: String,
}

impl Default for SchemalessConfig {
    fn default() -> Self {
        Self {
            default_attribute: "json_data".to_string(),
            path_operator: "->".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> ModelResult<Self> {
        toml::from_str(contents).map_err(|e| ModelError::Config(e.to_string()))
    }

    /// Loads configuration from `path`.
    /// Falls back to defaults when the file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No engine config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse engine config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read engine config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
