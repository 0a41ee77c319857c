//! # Validation Module
//!
//! Cart invariant checks applied to snapshots read back from storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Invariants Are Enforced                      │
//! │                                                                         │
//! │  Cart operations (cart.rs)                                             │
//! │  └── Invariants hold by construction, nothing to check                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Storage round-trip (snapshot.rs)                                      │
//! │  ├── Type validation (serde schema)                                    │
//! │  └── THIS MODULE: quantity >= 1, unique ids                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Rejected snapshot → cart store starts empty (logged)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Candidates passed to `add` are not validated; titles, image references and
//! prices are opaque.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::LineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates the quantity of a single line item.
///
/// ## Example
/// ```rust
/// use gomarket_core::validation::validate_quantity;
///
/// assert!(validate_quantity("A", 1).is_ok());
/// assert!(validate_quantity("A", 0).is_err());
/// ```
pub fn validate_quantity(id: &str, quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::QuantityNotPositive {
            id: id.to_string(),
            quantity,
        });
    }
    Ok(())
}

/// Validates a whole line item sequence against the cart invariants.
///
/// ## Rules
/// - Every quantity is at least 1
/// - No product id appears twice
///
/// Returns the first violation found, scanning in cart order.
pub fn validate_items(items: &[LineItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_quantity(&item.id, item.quantity)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductCandidate;

    fn item(id: &str, quantity: u32) -> LineItem {
        let mut item = ProductCandidate::new(id, "T", "u", 1.0).into_line_item();
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("A", 1).is_ok());
        assert!(validate_quantity("A", 999).is_ok());
        assert!(validate_quantity("A", 0).is_err());
    }

    #[test]
    fn test_validate_items() {
        assert!(validate_items(&[]).is_ok());
        assert!(validate_items(&[item("A", 1), item("B", 3)]).is_ok());

        assert_eq!(
            validate_items(&[item("A", 1), item("B", 0)]),
            Err(ValidationError::QuantityNotPositive {
                id: "B".to_string(),
                quantity: 0
            })
        );
        assert_eq!(
            validate_items(&[item("A", 1), item("A", 2)]),
            Err(ValidationError::DuplicateId { id: "A".to_string() })
        );
    }
}
