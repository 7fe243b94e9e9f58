//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKETPLACE_STORAGE` - Storage backend: `memory`, `file` or `sqlite` (default: file)
//! - `GO_MARKETPLACE_DATA_DIR` - Directory for the file backend (default: .go-marketplace)
//! - `GO_MARKETPLACE_DATABASE_URL` - SQLite URL (default: sqlite://go-marketplace.db?mode=rwc)
//! - `GO_MARKETPLACE_CART_KEY` - Storage key of the cart snapshot (default: @GoMarketplace:products)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::snapshot::DEFAULT_CART_KEY;

const DEFAULT_DATA_DIR: &str = ".go-marketplace";
const DEFAULT_DATABASE_URL: &str = "sqlite://go-marketplace.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where cart snapshots are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Lost when the process exits.
    Memory,
    /// One file per key in [`CartConfig::data_dir`].
    #[default]
    File,
    /// `kv_store` table at [`CartConfig::database_url`].
    Sqlite,
}

impl StorageBackend {
    /// The name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!(
                "unknown storage backend `{other}` (expected memory, file or sqlite)"
            )),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Storage backend for the snapshot
    pub backend: StorageBackend,
    /// Directory used by the file backend
    pub data_dir: PathBuf,
    /// Connection URL used by the SQLite backend
    pub database_url: String,
    /// Key the snapshot is stored under
    pub cart_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend = match lookup("GO_MARKETPLACE_STORAGE") {
            Some(value) => value
                .parse::<StorageBackend>()
                .map_err(|e| ConfigError::InvalidEnvVar("GO_MARKETPLACE_STORAGE".to_string(), e))?,
            None => defaults.backend,
        };

        let data_dir = lookup("GO_MARKETPLACE_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);
        let database_url = lookup("GO_MARKETPLACE_DATABASE_URL").unwrap_or(defaults.database_url);

        let cart_key = lookup("GO_MARKETPLACE_CART_KEY").unwrap_or(defaults.cart_key);
        if cart_key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GO_MARKETPLACE_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            backend,
            data_dir,
            database_url,
            cart_key,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(config.cart_key, "@GoMarketplace:products");
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("GO_MARKETPLACE_STORAGE", "SQLite"),
            ("GO_MARKETPLACE_DATA_DIR", "/tmp/cart"),
            ("GO_MARKETPLACE_DATABASE_URL", "sqlite::memory:"),
            ("GO_MARKETPLACE_CART_KEY", "@Shop:cart"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cart"));
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.cart_key, "@Shop:cart");
    }

    #[test]
    fn test_invalid_backend() {
        let err = CartConfig::from_lookup(lookup_from(&[("GO_MARKETPLACE_STORAGE", "redis")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref name, _) if name == "GO_MARKETPLACE_STORAGE"));
    }

    #[test]
    fn test_empty_cart_key_rejected() {
        let err = CartConfig::from_lookup(lookup_from(&[("GO_MARKETPLACE_CART_KEY", "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref name, _) if name == "GO_MARKETPLACE_CART_KEY"));
    }

    #[test]
    fn test_backend_names() {
        for backend in [StorageBackend::Memory, StorageBackend::File, StorageBackend::Sqlite] {
            assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), backend);
        }
    }
}
