//! Catalog view route handlers.
//!
//! The catalog page renders the filter controls and the product list. Every
//! control re-requests `/products` through htmx and receives only the list
//! fragment back. Requests from the search box are debounced per page
//! instance; a superseded request answers `204 No Content` so htmx leaves the
//! list untouched. A change to any other control supersedes a pending search,
//! since it already carries the current search text.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use capstone_core::{Product, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::bootstrap::{Layout, Page};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::search::{CatalogParams, CatalogQuery, PriceBand, Settled, SortKey, apply_filters};
use crate::services::{CartOp, CartStoreError};
use crate::state::AppState;
use crate::views::{hx_trigger, is_htmx_request, mutate_and_render};

/// Id of the search input; its requests are the debounced ones.
pub const SEARCH_INPUT_ID: &str = "search-input";

/// Price band select values and labels.
const PRICE_BANDS: &[(&str, &str)] = &[
    ("all", "All prices"),
    ("0-50", "Under $50"),
    ("50-200", "$50 - $200"),
    ("200-500", "$200 - $500"),
    ("500", "$500 & up"),
];

/// Sort select values and labels.
const SORT_KEYS: &[(SortKey, &str)] = &[
    (SortKey::Catalog, "Featured"),
    (SortKey::PriceLow, "Price: low to high"),
    (SortKey::PriceHigh, "Price: high to low"),
    (SortKey::Rating, "Top rated"),
];

/// One `<option>` of a filter select.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// Filter controls, pre-selected from the current query.
#[derive(Debug, Clone)]
pub struct FilterControls {
    pub categories: Vec<SelectOption>,
    pub prices: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub search: String,
    /// Token identifying this page instance for search debouncing.
    pub client: Uuid,
}

impl FilterControls {
    fn new(state: &AppState, query: &CatalogQuery) -> Self {
        let mut categories = vec![SelectOption::new(
            "all",
            "All categories",
            query.category.as_str() == "all",
        )];
        categories.extend(state.catalog().categories().into_iter().map(|category| {
            SelectOption::new(
                category.as_str(),
                category.label(),
                query.category.as_str() == category.as_str(),
            )
        }));

        let prices = PRICE_BANDS
            .iter()
            .map(|(value, label)| {
                SelectOption::new(*value, *label, PriceBand::parse(value) == query.price)
            })
            .collect();

        let sorts = SORT_KEYS
            .iter()
            .map(|(key, label)| SelectOption::new(key.as_str(), *label, *key == query.sort))
            .collect();

        Self {
            categories,
            prices,
            sorts,
            search: query.search.clone(),
            client: Uuid::new_v4(),
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub controls: FilterControls,
    pub products: Vec<&'static Product>,
}

/// Product list fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_list.html")]
pub struct ProductListTemplate {
    pub products: Vec<&'static Product>,
}

/// Details disclosure fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_details.html")]
pub struct ProductDetailsTemplate {
    pub product: &'static Product,
}

/// "Added to cart" confirmation fragment.
#[derive(Template)]
#[template(path = "partials/added_to_cart.html")]
pub struct AddedToCartTemplate {
    pub name: String,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
}

/// Display the catalog page, or just the product list for htmx requests.
#[instrument(skip(state, session, headers))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(params): Query<CatalogParams>,
) -> Response {
    let query = CatalogQuery::from_params(&params);

    if is_htmx_request(&headers) {
        if let Some(client) = params.client_token() {
            if hx_trigger(&headers) == Some(SEARCH_INPUT_ID) {
                if state.debouncer().settle(client).await == Settled::Superseded {
                    return StatusCode::NO_CONTENT.into_response();
                }
            } else {
                state.debouncer().supersede(client).await;
            }
        }

        let products = apply_filters(state.catalog(), &query);
        tracing::debug!(results = products.len(), "Catalog filtered");
        return ProductListTemplate { products }.into_response();
    }

    let store = state.cart_store(session);
    let layout = Layout::load(Page::Catalog, &store).await;

    ProductsIndexTemplate {
        layout,
        controls: FilterControls::new(&state, &query),
        products: apply_filters(state.catalog(), &query),
    }
    .into_response()
}

/// Display the details disclosure for one product.
///
/// # Errors
///
/// Returns 404 if the product is not in the catalog.
#[instrument(skip(state))]
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ProductDetailsTemplate> {
    let product = state
        .catalog()
        .find(ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductDetailsTemplate { product })
}

/// Add a product to the cart (HTMX).
///
/// Returns the confirmation fragment and refreshes every badge.
///
/// # Errors
///
/// Returns 400 for a zero quantity, 404 if the product is not in the catalog,
/// or an error if the cart cannot be written.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let product_id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .find(product_id)
        .ok_or(CartStoreError::UnknownProduct(product_id))?;

    let store = state.cart_store(session);
    let op = CartOp::Add {
        product_id,
        quantity,
    };

    let response = mutate_and_render(&store, op, |_| AddedToCartTemplate {
        name: product.name.clone(),
    })
    .await?;

    tracing::info!(%product_id, "Added to cart");
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &product_id.to_string())]),
    );
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use capstone_core::Catalog;

    fn state() -> AppState {
        AppState::new(StorefrontConfig::default())
    }

    #[test]
    fn test_controls_preselect_current_query() {
        let query = CatalogQuery::from_params(&CatalogParams {
            category: Some("fashion".to_string()),
            price: Some("50-200".to_string()),
            sort: Some("rating".to_string()),
            q: Some("  shirt ".to_string()),
            client: None,
        });
        let controls = FilterControls::new(&state(), &query);

        let selected = |options: &[SelectOption]| {
            options
                .iter()
                .filter(|o| o.selected)
                .map(|o| o.value.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(selected(&controls.categories), vec!["fashion"]);
        assert_eq!(selected(&controls.prices), vec!["50-200"]);
        assert_eq!(selected(&controls.sorts), vec!["rating"]);
        assert_eq!(controls.search, "shirt");
    }

    #[test]
    fn test_category_options_follow_catalog_order() {
        let controls = FilterControls::new(&state(), &CatalogQuery::default());
        let labels: Vec<&str> = controls
            .categories
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["All categories", "Electronics", "Fashion", "Accessories"]
        );
        assert!(controls.categories.first().unwrap().selected);
    }

    #[test]
    fn test_empty_list_renders_message() {
        let html = ProductListTemplate { products: vec![] }.render().unwrap();
        assert!(html.contains("No products found."));
    }

    #[test]
    fn test_list_renders_prices_and_actions() {
        let products = Catalog::standard().products().iter().take(2).collect();
        let html = ProductListTemplate { products }.render().unwrap();
        assert!(html.contains("Smartphone X1"));
        assert!(html.contains("$299.00"));
        assert!(html.contains("/products/2/details"));
        assert!(!html.contains("No products found."));
    }

    #[test]
    fn test_added_to_cart_message() {
        let html = AddedToCartTemplate {
            name: "Laptop Pro".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Laptop Pro added to cart"));
    }
}
