//! Shared render cycle for views that mutate the cart.
//!
//! Both the catalog ("add to cart") and the cart page (quantity controls,
//! remove, clear, checkout) follow the same cycle: apply one mutation to the
//! cart store, re-render the affected fragment in full from the new cart, and
//! refresh every badge on the page. [`mutate_and_render`] is that cycle;
//! callers only supply the operation and how to render their own fragment.
//!
//! Badge refresh is done twice over: an out-of-band fragment updates every
//! `.cart-count` element in the same response, and the `cart-updated`
//! trigger lets any other listener on the page react.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, Html, IntoResponse, Response};
use capstone_core::Cart;

use crate::error::Result;
use crate::services::{CartOp, CartStorage, CartStore};

/// htmx event fired after every cart mutation.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Set by htmx on every request it issues.
pub const HX_REQUEST: &str = "HX-Request";

/// Id of the element that issued an htmx request.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Response header asking htmx to do a full-page navigation.
pub const HX_REDIRECT: &str = "HX-Redirect";

/// Whether the request was issued by htmx (and so wants a fragment).
#[must_use]
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Id of the element that triggered an htmx request, if any.
#[must_use]
pub fn hx_trigger(headers: &HeaderMap) -> Option<&str> {
    headers.get(HX_TRIGGER).and_then(|value| value.to_str().ok())
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Out-of-band update for every badge on the page.
#[derive(Template)]
#[template(path = "partials/cart_count_oob.html")]
struct BadgeSyncTemplate {
    count: u32,
}

/// Render `fragment` followed by a badge refresh for `count`.
///
/// # Errors
///
/// Returns an error if either template fails to render.
pub fn with_badges(fragment: &impl Template, count: u32) -> Result<Response> {
    let mut body = fragment.render()?;
    body.push_str(&BadgeSyncTemplate { count }.render()?);

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED_EVENT)]),
        Html(body),
    )
        .into_response())
}

/// Apply `op`, then render the caller's fragment from the persisted cart.
///
/// The badge count is taken from the same cart value that was written, so the
/// response can never show a stale count.
///
/// # Errors
///
/// Returns an error if the mutation is rejected, the write fails, or
/// rendering fails.
pub async fn mutate_and_render<S, T, F>(
    store: &CartStore<'_, S>,
    op: CartOp,
    render: F,
) -> Result<Response>
where
    S: CartStorage,
    T: Template,
    F: FnOnce(&Cart) -> T,
{
    let cart = store.apply(op).await?;
    let fragment = render(&cart);
    with_badges(&fragment, cart.total_quantity())
}
