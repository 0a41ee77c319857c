//! # Cart Snapshot Format
//!
//! The textual form of a cart as written to storage.
//!
//! ## Format
//! A JSON array of line items in cart order:
//! ```json
//! [
//!   { "id": "A", "title": "Tee", "imageUrl": "https://img/a.png", "price": 10.0, "quantity": 2 },
//!   { "id": "B", "title": "Cap", "imageUrl": "https://img/b.png", "price": 5.5, "quantity": 1 }
//! ]
//! ```
//!
//! `decode(encode(cart))` yields an equal cart, in the same order. Prices
//! round-trip bit-for-bit, including `"NaN"`, `"Infinity"` and `"-Infinity"`
//! for prices that are not finite.

use crate::cart::Cart;
use crate::error::CoreResult;
use crate::types::LineItem;
use crate::validation::validate_items;

/// Serializes line items into the persisted snapshot format.
pub fn encode(items: &[LineItem]) -> CoreResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parses a persisted snapshot back into a cart.
///
/// ## Errors
/// - `MalformedSnapshot` if the text is not a line item array
/// - `Validation` if it parses but breaks a cart invariant
pub fn decode(text: &str) -> CoreResult<Cart> {
    let items: Vec<LineItem> = serde_json::from_str(text)?;
    validate_items(&items)?;
    Ok(Cart::from_items(items))
}

// =============================================================================
// Unit Tests
// =============================================================================
