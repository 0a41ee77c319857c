//! # Cart State Machine
//!
//! The ordered, uniqueness-preserving collection of line items and the pure
//! transitions that mutate it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Transitions                               │
//! │                                                                         │
//! │  Operation            Precondition              Effect                  │
//! │  ─────────            ────────────              ──────                  │
//! │                                                                         │
//! │  add(candidate) ────► id not in cart ─────────► push {.., qty: 1}      │
//! │                 ────► id in cart ─────────────► increment(id)          │
//! │                                                                         │
//! │  increment(id) ─────► id in cart ─────────────► qty += 1               │
//! │                ─────► id missing ─────────────► Unchanged              │
//! │                                                                         │
//! │  decrement(id) ─────► qty > 1 ────────────────► qty -= 1               │
//! │                ─────► qty == 1 ───────────────► remove (order kept)    │
//! │                ─────► id missing ─────────────► Unchanged              │
//! │                                                                         │
//! │  clear() ───────────► not empty ──────────────► items.clear()          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `id` (adding the same product increases quantity)
//! - Quantity is always >= 1 (reaching zero removes the item)
//! - Insertion order is preserved; removal keeps the relative order of the rest

use serde::{Deserialize, Serialize};

use crate::types::{CartTotals, LineItem, ProductCandidate};

/// What a cart operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartChange {
    /// A new line item was appended with quantity 1.
    Added { id: String },
    /// An existing line item's quantity went up.
    Incremented { id: String, quantity: u32 },
    /// An existing line item's quantity went down but stayed >= 1.
    Decremented { id: String, quantity: u32 },
    /// A line item dropped to zero and was removed.
    Removed { id: String },
    /// All line items were removed.
    Cleared,
    /// Nothing matched; the cart is as it was.
    Unchanged,
}

impl CartChange {
    /// Returns true if the operation modified the cart.
    pub fn is_change(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from items that already satisfy the cart invariants.
    ///
    /// Use [`crate::snapshot::decode`] for untrusted input; it validates first.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Cart { items }
    }

    /// Adds a product to the cart or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: same as [`Cart::increment`]; the stored
    ///   title, image and price are kept
    /// - If product not in cart: appends a new item with quantity 1
    pub fn add(&mut self, candidate: ProductCandidate) -> CartChange {
        if self.position(&candidate.id).is_some() {
            return self.increment(&candidate.id);
        }

        let id = candidate.id.clone();
        self.items.push(candidate.into_line_item());
        CartChange::Added { id }
    }

    /// Increases the quantity of the matching item by one.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented {
                    id: item.id.clone(),
                    quantity: item.quantity,
                }
            }
            None => CartChange::Unchanged,
        }
    }

    /// Decreases the quantity of the matching item by one.
    ///
    /// ## Behavior
    /// - Quantity 1: the item is removed; when it was the only item the cart
    ///   becomes empty
    /// - Quantity > 1: quantity goes down by one
    /// - Product not found: no-op
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.position(id) else {
            return CartChange::Unchanged;
        };

        if self.items[index].quantity <= 1 {
            let removed = self.items.remove(index);
            return CartChange::Removed { id: removed.id };
        }

        let item = &mut self.items[index];
        item.quantity -= 1;
        CartChange::Decremented {
            id: item.id.clone(),
            quantity: item.quantity,
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        CartChange::Cleared
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart and returns its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Looks up an item by product id.
    pub fn find(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the number of unique items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Returns the display summary.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self.items())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
