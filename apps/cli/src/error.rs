//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the gomarket CLI                       │
//! │                                                                         │
//! │  Command Function                                                      │
//! │  Result<CartResponse, ApiError>                                        │
//! │         │                                                               │
//! │         ├── DbError (open/migrate failed) ─────────┐                   │
//! │         ├── CartError (bad config, usage) ─────────┤                   │
//! │         │                                          ▼                   │
//! │         │                                      ApiError                │
//! │         │                                          │                   │
//! │         ▼                                          ▼                   │
//! │  stdout: {"items":[..],"totals":{..}}      stdout: {"code","message"} │
//! │  exit 0                                    exit 1                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_cart::CartError;
use gomarket_db::DbError;
use serde::Serialize;

/// Error printed when a command fails.
///
/// ```json
/// {
///   "code": "CONFIG_ERROR",
///   "message": "Invalid cart configuration: storage key must not be empty"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Database could not be opened or queried
    DatabaseError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// The cart was used without a mounted provider
    UsageError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts cart service errors to API errors.
impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Storage(db) => ApiError::from(db),
            e if e.is_config_error() => ApiError::new(ErrorCode::ConfigError, e.to_string()),
            e if e.is_usage_error() => ApiError::new(ErrorCode::UsageError, e.to_string()),
            e => ApiError::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ApiError::from(CartError::OutsideProvider);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"code":"USAGE_ERROR","message":"cart used outside of a mounted CartProvider"}"#
        );
    }

    #[test]
    fn test_cart_error_mapping() {
        assert_eq!(ApiError::from(CartError::OutsideProvider).code, ErrorCode::UsageError);
        assert_eq!(ApiError::from(CartError::WriterClosed).code, ErrorCode::UsageError);
        assert_eq!(
            ApiError::from(CartError::InvalidConfig("x".into())).code,
            ErrorCode::ConfigError
        );
        assert_eq!(
            ApiError::from(CartError::Storage(DbError::PoolExhausted)).code,
            ErrorCode::DatabaseError
        );
    }

    #[test]
    fn test_db_error_hides_details() {
        let err = ApiError::from(DbError::QueryFailed("no such table: key_value".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("key_value"));
    }
}
