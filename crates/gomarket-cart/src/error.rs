//! # Cart Service Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Usage       │  │  Configuration  │  │      Storage            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  OutsideProvider│  │  InvalidConfig  │  │  Storage(DbError)       │ │
//! │  │  WriterClosed   │  │  ConfigLoad/Save│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshot read failures and persist write failures never show up here:
//! the first is recovered during load, the second is logged by the writer.

use gomarket_db::DbError;
use thiserror::Error;

/// Result type alias for cart service operations.
pub type CartResult<T> = Result<T, CartError>;

/// Errors surfaced by the cart service.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Usage Errors
    // =========================================================================
    /// The cart was accessed with no mounted provider.
    ///
    /// This is a programming error, not a data outcome. Callers should treat
    /// it as fatal.
    #[error("cart used outside of a mounted CartProvider")]
    OutsideProvider,

    /// The persist writer has stopped (the store was shut down).
    #[error("cart persist writer is no longer running")]
    WriterClosed,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Opening or talking to the storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl CartError {
    /// Returns true if this error is a misuse of the cart API.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, CartError::OutsideProvider | CartError::WriterClosed)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}
