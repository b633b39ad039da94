//! The persisted cart aggregate.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartEntry`] values with two
//! invariants, enforced by every method that can change it:
//!
//! - a product ID appears at most once
//! - no entry has a quantity of zero (it is removed instead)
//!
//! # Storage format
//!
//! ```text
//! [{"id": 2, "qty": 2}, {"id": 5, "qty": 1}]
//! ```
//!
//! Loading is tolerant of hand-edited or stale data: entries with a
//! non-positive quantity are dropped and duplicate IDs are merged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Errors decoding a persisted cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The stored text is not a JSON array of `{id, qty}` objects.
    #[error("malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One product line in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

/// Wire shape, wide enough to accept zero and negative quantities.
#[derive(Deserialize)]
struct StoredEntry {
    id: ProductId,
    qty: i64,
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Decode a cart from its stored JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Malformed`] if the text is not a JSON array of
    /// `{id, qty}` objects.
    pub fn from_json(text: &str) -> Result<Self, CartError> {
        let stored: Vec<StoredEntry> = serde_json::from_str(text)?;
        let mut cart = Self::new();
        for entry in stored {
            let qty = u32::try_from(entry.qty).unwrap_or(if entry.qty > 0 { u32::MAX } else { 0 });
            cart.add(entry.id, qty);
        }
        Ok(cart)
    }

    /// Encode the cart as its stored JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A Vec of two integers per entry cannot fail to serialize.
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantity for a product, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.position(product_id)
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.quantity)
    }

    /// Sum of all quantities (the badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |acc, entry| acc.saturating_add(entry.quantity))
    }

    /// Add `quantity` units of a product.
    ///
    /// Increments the existing entry or appends a new one. Adding zero units
    /// leaves the cart unchanged.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.entry_mut(product_id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry {
                product_id,
                quantity,
            }),
        }
    }

    /// Set a product's quantity; zero or below removes the entry.
    ///
    /// Products not already in the cart are left out.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(entry) = self.entry_mut(product_id) {
            entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Increase a product's quantity by one, if present.
    pub fn increment(&mut self, product_id: ProductId) {
        if let Some(entry) = self.entry_mut(product_id) {
            entry.quantity = entry.quantity.saturating_add(1);
        }
    }

    /// Decrease a product's quantity by one, removing it at zero.
    pub fn decrement(&mut self, product_id: ProductId) {
        if let Some(current) = self.quantity_of(product_id) {
            self.set_quantity(product_id, i64::from(current) - 1);
        }
    }

    /// Remove a product. Absent products are a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.entries.retain(|entry| entry.product_id != product_id);
    }

    /// Keep only the entries whose product satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(ProductId) -> bool) {
        self.entries.retain(|entry| keep(entry.product_id));
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.product_id == product_id)
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn id(n: i32) -> ProductId {
        ProductId::new(n)
    }

    fn assert_invariants(cart: &Cart) {
        let mut seen = Vec::new();
        for entry in cart.entries() {
            assert!(entry.quantity > 0, "zero quantity entry: {entry:?}");
            assert!(!seen.contains(&entry.product_id), "duplicate id: {entry:?}");
            seen.push(entry.product_id);
        }
    }

    #[test]
    fn test_add_twice_merges_into_one_entry() {
        let mut cart = Cart::new();
        cart.add(id(2), 1);
        cart.add(id(2), 1);

        assert_eq!(
            cart.entries(),
            &[CartEntry {
                product_id: id(2),
                quantity: 2
            }]
        );
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add(id(5), 1);
        cart.add(id(1), 1);
        cart.add(id(5), 3);

        let ids: Vec<_> = cart.entries().iter().map(|e| e.product_id).collect();
        assert_eq!(ids, vec![id(5), id(1)]);
        assert_eq!(cart.quantity_of(id(5)), Some(4));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add(id(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add(id(1), 2);
        cart.add(id(2), 2);

        cart.set_quantity(id(1), 0);
        cart.set_quantity(id(2), -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_ignores_absent_product() {
        let mut cart = Cart::new();
        cart.set_quantity(id(9), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_entry() {
        let mut cart = Cart::new();
        cart.add(id(3), 1);
        cart.decrement(id(3));

        assert!(cart.is_empty());
        assert_eq!(cart.to_json(), "[]");
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        cart.add(id(3), 1);
        cart.increment(id(3));
        cart.increment(id(3));
        cart.decrement(id(3));
        assert_eq!(cart.quantity_of(id(3)), Some(2));

        cart.increment(id(4));
        assert_eq!(cart.quantity_of(id(4)), None);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(id(1), 1);
        cart.remove(id(2));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_invariants_hold_over_operation_sequence() {
        let mut cart = Cart::new();
        let ops: [(i32, i64); 12] = [
            (1, 1),
            (2, 3),
            (1, -1),
            (3, 0),
            (2, -3),
            (1, 2),
            (4, 1),
            (4, -1),
            (5, 5),
            (1, -10),
            (5, 1),
            (2, 1),
        ];

        for (step, (n, delta)) in ops.into_iter().enumerate() {
            match step % 3 {
                0 => cart.add(id(n), u32::try_from(delta.max(0)).unwrap()),
                1 => {
                    let current = i64::from(cart.quantity_of(id(n)).unwrap_or(0));
                    cart.set_quantity(id(n), current + delta);
                }
                _ => {
                    if delta < 0 {
                        cart.remove(id(n));
                    } else {
                        cart.add(id(n), 1);
                    }
                }
            }
            assert_invariants(&cart);
        }
    }

    #[test]
    fn test_retain_keeps_order() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 1);
        cart.add(ProductId::new(99), 2);
        cart.add(ProductId::new(1), 4);

        cart.retain(|id| id != ProductId::new(99));

        let ids: Vec<i32> = cart.entries().iter().map(|e| e.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_json_format() {
        let mut cart = Cart::new();
        cart.add(id(2), 2);
        cart.add(id(6), 1);
        assert_eq!(cart.to_json(), r#"[{"id":2,"qty":2},{"id":6,"qty":1}]"#);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let mut cart = Cart::new();
        cart.add(id(6), 1);
        cart.add(id(2), 4);
        cart.add(id(3), 2);

        let reloaded = Cart::from_json(&cart.to_json()).unwrap();
        assert_eq!(reloaded, cart);
    }

    #[test]
    fn test_from_json_normalizes_stale_data() {
        let cart =
            Cart::from_json(r#"[{"id":1,"qty":2},{"id":2,"qty":0},{"id":1,"qty":3},{"id":3,"qty":-1}]"#)
                .unwrap();
        assert_eq!(
            cart.entries(),
            &[CartEntry {
                product_id: id(1),
                quantity: 5
            }]
        );
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Cart::from_json("not json").is_err());
        assert!(Cart::from_json(r#"{"id":1}"#).is_err());
        assert!(Cart::from_json(r#"[{"id":"one","qty":1}]"#).is_err());
    }
}
