//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Snapshot decoding failures                     │
//! │  └── ValidationError  - Cart invariant violations                      │
//! │                                                                         │
//! │  gomarket-db errors (separate crate)                                   │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  gomarket-cart errors (separate crate)                                 │
//! │  └── CartError        - Usage errors, writer and config failures       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → (logged, cart starts empty)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations themselves never fail: unknown ids are no-ops. The only
//! fallible core operation is turning persisted text back into a cart.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The persisted snapshot is not valid JSON for a line item sequence.
    ///
    /// ## When This Occurs
    /// - Storage holds a value written by an incompatible version
    /// - The value was truncated or edited by hand
    #[error("Malformed cart snapshot: {0}")]
    MalformedSnapshot(String),

    /// The snapshot parsed but breaks a cart invariant.
    #[error("Invalid cart snapshot: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedSnapshot(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Cart invariant violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A line item carries a quantity below one.
    #[error("quantity of '{id}' must be at least 1, got {quantity}")]
    QuantityNotPositive { id: String, quantity: u32 },

    /// Two line items share the same product id.
    #[error("product id '{id}' appears more than once")]
    DuplicateId { id: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
