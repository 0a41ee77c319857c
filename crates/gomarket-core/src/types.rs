//! # Domain Types
//!
//! Core domain types used throughout the GoMarketplace cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  add_to_cart  ┌──────────────────┐               │
//! │  │ ProductCandidate │ ────────────► │     LineItem     │               │
//! │  │  ──────────────  │               │  ──────────────  │               │
//! │  │  id              │               │  id              │               │
//! │  │  title           │               │  title           │               │
//! │  │  image_url       │               │  image_url       │               │
//! │  │  price           │               │  price           │               │
//! │  └──────────────────┘               │  quantity (≥ 1)  │               │
//! │                                     └──────────────────┘               │
//! │                                                                         │
//! │  ┌──────────────────┐                                                  │
//! │  │    CartTotals    │  item_count, total_quantity (display summary)   │
//! │  └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! All types serialize with camelCase field names (`imageUrl`), which is the
//! persisted snapshot format and what the display layer receives.
//!
//! JSON has no NaN or infinity, so prices that are not finite are written as
//! the strings `"NaN"`, `"Infinity"` and `"-Infinity"`. Finite prices stay
//! plain numbers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Line Item
// =============================================================================

/// One distinct product in the cart.
///
/// ## Snapshot Pattern
/// Title, image and price are captured when the product is first added and are
/// never overwritten by later adds of the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Product identifier, unique within the cart.
    pub id: String,

    /// Display name (opaque).
    pub title: String,

    /// Image reference (opaque).
    ///
    /// Older snapshots wrote this field as `image_url`; both are accepted.
    #[serde(alias = "image_url")]
    pub image_url: String,

    /// Unit price. No currency semantics.
    #[serde(with = "price")]
    #[ts(type = "number | string")]
    pub price: f64,

    /// Units in the cart. Always at least 1.
    pub quantity: u32,
}

// =============================================================================
// Product Candidate
// =============================================================================

/// A product offered for the cart: a line item without a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductCandidate {
    pub id: String,
    pub title: String,
    #[serde(alias = "image_url")]
    pub image_url: String,
    #[serde(with = "price")]
    #[ts(type = "number | string")]
    pub price: f64,
}

impl ProductCandidate {
    /// Creates a candidate from its parts.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        ProductCandidate {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turns the candidate into a fresh line item with quantity 1.
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart summary for the display layer.
///
/// Counts only; pricing is not computed by the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct products.
    pub item_count: usize,
    /// Sum of all quantities.
    pub total_quantity: u64,
}

impl From<&[LineItem]> for CartTotals {
    fn from(items: &[LineItem]) -> Self {
        CartTotals {
            item_count: items.len(),
            total_quantity: items.iter().map(|i| u64::from(i.quantity)).sum(),
        }
    }
}

// =============================================================================
// Price Encoding
// =============================================================================

mod price {
    use serde::de::{self, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    pub fn serialize<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if price.is_finite() {
            serializer.serialize_f64(*price)
        } else if price.is_nan() {
            serializer.serialize_str(NAN)
        } else if price.is_sign_positive() {
            serializer.serialize_str(INFINITY)
        } else {
            serializer.serialize_str(NEG_INFINITY)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(price) => Ok(price),
            Repr::Text(text) => match text.as_str() {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_into_line_item() {
        let item = ProductCandidate::new("A", "Tee", "u", 10.0).into_line_item();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id, "A");
        assert_eq!(item.price, 10.0);
    }

    #[test]
    fn test_line_item_uses_camel_case() {
        let item = ProductCandidate::new("A", "Tee", "u", 10.0).into_line_item();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["imageUrl"], "u");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_line_item_accepts_legacy_image_url() {
        let item: LineItem = serde_json::from_str(
            r#"{"id":"A","title":"Tee","image_url":"u","price":10,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(item.image_url, "u");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_non_finite_prices_are_written_as_strings() {
        let cases = [
            (f64::NAN, "NaN"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
        ];
        for (price, text) in cases {
            let item = ProductCandidate::new("A", "Tee", "u", price).into_line_item();
            let json = serde_json::to_value(&item).unwrap();
            assert_eq!(json["price"], text);

            let back: LineItem = serde_json::from_value(json).unwrap();
            assert_eq!(back.price.to_bits(), price.to_bits());
        }
    }

    #[test]
    fn test_price_accepts_integers_and_rejects_other_text() {
        let item: LineItem = serde_json::from_str(
            r#"{"id":"A","title":"Tee","imageUrl":"u","price":10,"quantity":1}"#,
        )
        .unwrap();
        assert_eq!(item.price, 10.0);

        let bad = serde_json::from_str::<LineItem>(
            r#"{"id":"A","title":"Tee","imageUrl":"u","price":"cheap","quantity":1}"#,
        );
        assert!(bad.is_err());

        let null = serde_json::from_str::<LineItem>(
            r#"{"id":"A","title":"Tee","imageUrl":"u","price":null,"quantity":1}"#,
        );
        assert!(null.is_err());
    }

    #[test]
    fn test_totals() {
        let mut a = ProductCandidate::new("A", "Tee", "u", 10.0).into_line_item();
        a.quantity = 3;
        let b = ProductCandidate::new("B", "Cap", "v", 5.5).into_line_item();
        let totals = CartTotals::from([a, b].as_slice());

        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 4);
    }
}
