//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_KEY=@GoMarketplace:products                       │
//! │     GOMARKET_DB_PATH=/var/lib/gomarket/gomarket.db                     │
//! │     GOMARKET_EVENT_CAPACITY=128                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cart/cart.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.gomarket.cart/cart.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key = "@GoMarketplace:products", capacity = 64                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarketplace:products"
//! database_path = "/path/to/gomarket.db"  # optional
//!
//! [events]
//! capacity = 64
//! ```

use directories::ProjectDirs;
use gomarket_core::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

const ENV_STORAGE_KEY: &str = "GOMARKET_STORAGE_KEY";
const ENV_DB_PATH: &str = "GOMARKET_DB_PATH";
const ENV_EVENT_CAPACITY: &str = "GOMARKET_EVENT_CAPACITY";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart snapshot lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite database file. Falls back to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Event Settings
// =============================================================================

/// Change notification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Broadcast buffer size. Receivers further behind than this lose the
    /// oldest events.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    64
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            capacity: default_capacity(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub events: EventSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig("storage key must not be empty".into()));
        }

        // A zero-size event buffer could hold nothing.
        if self.events.capacity == 0 {
            return Err(CartError::InvalidConfig(
                "events.capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(capacity) = lookup(ENV_EVENT_CAPACITY) {
            match capacity.parse::<usize>() {
                Ok(c) => self.events.capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring non-numeric event capacity"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Returns the default SQLite database path.
    pub fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("gomarket.db"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "gomarket", "cart")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the configured database path, or the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage
            .database_path
            .clone()
            .or_else(Self::default_database_path)
    }

    /// Returns the event broadcast capacity.
    pub fn event_capacity(&self) -> usize {
        self.events.capacity
    }
}
