//! Capstone Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront:
//! - the immutable product [`catalog`]
//! - the persisted [`cart`] aggregate and its invariants
//! - newtype wrappers for IDs, prices and emails in [`types`]
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! sessions, no HTTP. Storage and rendering live in the storefront crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartEntry, CartError};
pub use catalog::{Catalog, CartLine, Category, JoinedCart, Product};
pub use types::*;
