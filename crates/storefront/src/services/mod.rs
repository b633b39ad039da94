//! Storefront services.
//!
//! - [`cart_store`] - per-visitor cart persistence
//! - [`contact`] - contact form validation

pub mod cart_store;
pub mod contact;

pub use cart_store::{
    CART_STORAGE_KEY, CartOp, CartStorage, CartStore, CartStoreError, MemoryStorage, StorageError,
};
pub use contact::{ContactError, ContactForm, ContactMessage};
