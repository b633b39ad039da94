//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About page
//!
//! # Catalog
//! GET  /products               - Catalog page (list fragment for HTMX)
//! GET  /products/{id}/details  - Details disclosure fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! GET  /cart/panel             - Cart panel fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add to cart (returns confirmation, triggers cart-updated)
//! POST /cart/increment         - Quantity +1 (returns cart panel)
//! POST /cart/decrement         - Quantity -1, removes at zero (returns cart panel)
//! POST /cart/remove            - Remove line (returns cart panel)
//! POST /cart/clear             - Clear; asks for confirmation unless confirmed=true
//! POST /cart/checkout          - Simulated checkout (empties the cart)
//!
//! # Contact
//! GET  /contact                - Contact page
//! POST /contact                - Submit (returns form fragment for HTMX)
//!
//! # Navigation
//! GET  /shortcuts/{key}        - Keyboard shortcut redirect
//! *    (fallback)              - Page resolution by terminal path segment
//! ```

pub mod cart;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}/details", get(products::details))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/panel", get(cart::panel))
        .route("/count", get(cart::count))
        .route("/add", post(products::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(pages::about))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/contact", get(contact::show).post(contact::submit))
        .route("/shortcuts/{key}", get(pages::shortcut))
        .fallback(pages::fallback)
}
