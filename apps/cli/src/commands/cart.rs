//! # Cart Commands
//!
//! One function per cart subcommand. Each applies its operation to the
//! mounted store, waits for the write to reach storage, and returns the
//! cart as the display layer shows it.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐  add_to_cart  ┌──────────┐  decrement (qty 1)            │
//! │  │  Empty   │──────────────►│ In Cart  │──────────────┐                │
//! │  │  Cart    │◄──────────────│          │◄─────────────┘                │
//! │  └──────────┘  clear_cart   └──────────┘  add_to_cart / increment      │
//! │       ▲        or last item       │                                     │
//! │       │        decremented        │                                     │
//! │       └───────────────────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_cart::CartStore;
use gomarket_core::{CartTotals, LineItem, ProductCandidate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Cart response including items and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl From<&[LineItem]> for CartResponse {
    fn from(items: &[LineItem]) -> Self {
        CartResponse {
            items: items.to_vec(),
            totals: CartTotals::from(items),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartStore) -> CartResponse {
    debug!("get_cart command");
    cart.with_products(|items| CartResponse::from(items))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases, stored details are kept
/// - If product not in cart: added as new item with quantity 1
pub async fn add_to_cart(
    cart: &CartStore,
    candidate: ProductCandidate,
) -> Result<CartResponse, ApiError> {
    debug!(id = %candidate.id, "add_to_cart command");

    cart.add_to_cart(candidate)?;
    persisted(cart).await
}

/// Increments a product's quantity. Unknown ids leave the cart unchanged.
pub async fn increment(cart: &CartStore, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment command");

    cart.increment(id)?;
    persisted(cart).await
}

/// Decrements a product's quantity, removing it at zero. Unknown ids leave
/// the cart unchanged.
pub async fn decrement(cart: &CartStore, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement command");

    cart.decrement(id)?;
    persisted(cart).await
}

/// Clears all items from the cart.
pub async fn clear_cart(cart: &CartStore) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    cart.clear()?;
    persisted(cart).await
}

/// Waits for the write, then reports the cart.
async fn persisted(cart: &CartStore) -> Result<CartResponse, ApiError> {
    cart.flush().await?;
    Ok(get_cart(cart))
}
