//! Cart view route handlers.
//!
//! The cart page wraps a single panel (`#cart-panel`). Every control on the
//! panel posts one mutation and gets the whole panel back, re-rendered from
//! the stored cart, together with a refresh of every badge on the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use capstone_core::{Cart, Catalog, JoinedCart, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::bootstrap::{Layout, Page};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::services::CartOp;
use crate::state::AppState;
use crate::views::{CartCountTemplate, mutate_and_render};

/// Notice shown after the simulated checkout.
pub const CHECKOUT_NOTICE: &str = "Checkout simulated - thank you!";

/// Cart contents joined against the catalog, ready for display.
pub struct CartPanel {
    pub cart: JoinedCart<'static>,
    pub notice: Option<&'static str>,
}

impl CartPanel {
    /// Join `cart` against `catalog`.
    ///
    /// Entries whose product is no longer in the catalog are skipped and
    /// logged; the rest of the cart still renders.
    #[must_use]
    pub fn build(catalog: &'static Catalog, cart: &Cart) -> Self {
        let joined = catalog.join(cart);
        for product_id in &joined.missing {
            tracing::warn!(%product_id, "Cart entry references a product missing from the catalog");
        }
        Self {
            cart: joined,
            notice: None,
        }
    }

    /// True when nothing is stored at all.
    ///
    /// A cart holding only unknown products is not empty: it keeps its clear
    /// and checkout controls so the visitor can get rid of those entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty() && self.cart.missing.is_empty()
    }

    #[must_use]
    fn with_notice(mut self, notice: &'static str) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub panel: CartPanel,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub panel: CartPanel,
}

/// "Clear all items?" confirmation fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_clear_confirm.html")]
pub struct ClearConfirmTemplate {
    pub item_count: u32,
}

/// Form data naming one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: i32,
}

impl LineForm {
    const fn product_id(&self) -> ProductId {
        ProductId::new(self.product_id)
    }
}

/// Clear cart form data.
#[derive(Debug, Default, Deserialize)]
pub struct ClearForm {
    #[serde(default)]
    pub confirmed: bool,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> CartShowTemplate {
    let store = state.cart_store(session);
    let cart = store.read().await;

    CartShowTemplate {
        layout: Layout::with_count(Page::Cart, cart.total_quantity()),
        panel: CartPanel::build(state.catalog(), &cart),
    }
}

/// Display the cart panel fragment (for HTMX).
#[instrument(skip(state, session))]
pub async fn panel(State(state): State<AppState>, session: Session) -> CartPanelTemplate {
    let cart = state.cart_store(session).read().await;

    CartPanelTemplate {
        panel: CartPanel::build(state.catalog(), &cart),
    }
}

/// Get cart count badge (for HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: state.cart_store(session).badge_count().await,
    }
}

/// Apply `op` and answer with the re-rendered panel.
async fn mutate_panel(
    state: &AppState,
    session: Session,
    op: CartOp,
    notice: Option<&'static str>,
) -> Result<Response> {
    let catalog = state.catalog();
    let store = state.cart_store(session);

    mutate_and_render(&store, op, |cart| {
        let panel = CartPanel::build(catalog, cart);
        CartPanelTemplate {
            panel: match notice {
                Some(notice) => panel.with_notice(notice),
                None => panel,
            },
        }
    })
    .await
}

/// Increase a line's quantity by one (HTMX).
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    mutate_panel(&state, session, CartOp::Increment(form.product_id()), None).await
}

/// Decrease a line's quantity by one, removing it at zero (HTMX).
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    mutate_panel(&state, session, CartOp::Decrement(form.product_id()), None).await
}

/// Remove a line (HTMX).
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    mutate_panel(&state, session, CartOp::Remove(form.product_id()), None).await
}

/// Clear the cart (HTMX).
///
/// Without `confirmed=true` nothing is changed and the confirmation prompt
/// is returned instead.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ClearForm>,
) -> Result<Response> {
    if !form.confirmed {
        let item_count = state.cart_store(session).badge_count().await;
        return Ok(ClearConfirmTemplate { item_count }.into_response());
    }

    tracing::info!("Cart cleared");
    add_breadcrumb("cart", "Cart cleared", None);
    mutate_panel(&state, session, CartOp::Clear, None).await
}

/// Simulated checkout (HTMX).
///
/// There is no order record: the cart is emptied unconditionally and the
/// thank-you notice is shown above the empty cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    tracing::info!("Checkout simulated");
    add_breadcrumb("cart", "Checkout simulated", None);
    mutate_panel(&state, session, CartOp::Clear, Some(CHECKOUT_NOTICE)).await
}
