//! Cart store: the only writer of a visitor's persisted cart.
//!
//! The cart is kept as JSON text under a single fixed key in a string
//! key/value store ([`CartStorage`]). In production that store is the
//! visitor's session; tests use [`MemoryStorage`].
//!
//! Every mutation is a read-modify-write through [`CartStore::apply`] and
//! returns the cart exactly as it was persisted, so callers can refresh the
//! badge count from the same value they just wrote.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use capstone_core::{Cart, Catalog, ProductId};
use thiserror::Error;
use tower_sessions::Session;

/// Storage key for the persisted cart.
pub const CART_STORAGE_KEY: &str = "capstone_cart_v1";

/// Failure of the underlying key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The product is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The cart could not be written.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Minimal string key/value storage, shaped like browser local storage.
#[allow(async_fn_in_trait)]
pub trait CartStorage {
    /// Read the value stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl CartStorage for Session {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        Ok(self.insert(key, value).await?)
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove::<serde_json::Value>(key).await?;
        Ok(())
    }
}

/// In-process storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl CartStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// A single cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    Add { product_id: ProductId, quantity: u32 },
    SetQuantity { product_id: ProductId, quantity: i64 },
    Increment(ProductId),
    Decrement(ProductId),
    Remove(ProductId),
    Clear,
}

impl CartOp {
    fn apply_to(self, cart: &mut Cart) {
        match self {
            Self::Add {
                product_id,
                quantity,
            } => cart.add(product_id, quantity),
            Self::SetQuantity {
                product_id,
                quantity,
            } => cart.set_quantity(product_id, quantity),
            Self::Increment(product_id) => cart.increment(product_id),
            Self::Decrement(product_id) => cart.decrement(product_id),
            Self::Remove(product_id) => cart.remove(product_id),
            Self::Clear => cart.clear(),
        }
    }
}

/// Cart store for one visitor.
pub struct CartStore<'a, S> {
    storage: S,
    catalog: &'a Catalog,
}

impl<'a, S: CartStorage> CartStore<'a, S> {
    /// Create a store over `storage`, validating additions against `catalog`.
    pub const fn new(storage: S, catalog: &'a Catalog) -> Self {
        Self { storage, catalog }
    }

    /// Read the persisted cart.
    ///
    /// Missing, unreadable or malformed data reads as an empty cart.
    pub async fn read(&self) -> Cart {
        let raw = match self.storage.get_item(CART_STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart, treating as empty");
                return Cart::new();
            }
        };

        Cart::from_json(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Discarding unreadable cart data");
            Cart::new()
        })
    }

    /// Total quantity across the persisted cart.
    pub async fn badge_count(&self) -> u32 {
        self.read().await.total_quantity()
    }

    /// Apply one mutation and persist the result.
    ///
    /// Entries whose product is no longer in the catalog are dropped from the
    /// written cart. An empty result deletes the stored key rather than
    /// writing `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::UnknownProduct`] when adding a product that is
    /// not in the catalog, and [`CartStoreError::Storage`] if the write fails.
    pub async fn apply(&self, op: CartOp) -> Result<Cart, CartStoreError> {
        if let CartOp::Add { product_id, .. } = op
            && !self.catalog.contains(product_id)
        {
            return Err(CartStoreError::UnknownProduct(product_id));
        }

        let mut cart = self.read().await;
        op.apply_to(&mut cart);

        let before = cart.len();
        cart.retain(|product_id| self.catalog.contains(product_id));
        if cart.len() < before {
            tracing::warn!(dropped = before.saturating_sub(cart.len()), "Pruned cart entries missing from the catalog");
        }

        if cart.is_empty() {
            self.storage.remove_item(CART_STORAGE_KEY).await?;
        } else {
            self.storage
                .set_item(CART_STORAGE_KEY, cart.to_json())
                .await?;
        }

        tracing::debug!(?op, items = cart.total_quantity(), "Cart updated");
        Ok(cart)
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::Add {
            product_id,
            quantity,
        })
        .await
    }

    /// Set a product's quantity; zero or below removes it.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn set_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::SetQuantity {
            product_id,
            quantity,
        })
        .await
    }

    /// Increase a product's quantity by one. Absent products are ignored.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn increment(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::Increment(product_id)).await
    }

    /// Decrease a product's quantity by one, removing it at zero.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn decrement(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::Decrement(product_id)).await
    }

    /// Remove a product if present.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::Remove(product_id)).await
    }

    /// Delete all persisted cart data.
    ///
    /// # Errors
    ///
    /// See [`CartStore::apply`].
    pub async fn clear(&self) -> Result<Cart, CartStoreError> {
        self.apply(CartOp::Clear).await
    }
}
