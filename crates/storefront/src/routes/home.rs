//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use capstone_core::{Catalog, Product};
use tower_sessions::Session;
use tracing::instrument;

use crate::bootstrap::{Layout, Page};
use crate::filters;
use crate::search::{CatalogQuery, SortKey, apply_filters};
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<&'static Product>,
}

/// The highest-rated products, best first.
#[must_use]
pub fn featured_products(catalog: &Catalog) -> Vec<&Product> {
    let query = CatalogQuery {
        sort: SortKey::Rating,
        ..CatalogQuery::default()
    };
    let mut products = apply_filters(catalog, &query);
    products.truncate(FEATURED_COUNT);
    products
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> HomeTemplate {
    let store = state.cart_store(session);

    HomeTemplate {
        layout: Layout::load(Page::Home, &store).await,
        featured: featured_products(state.catalog()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_featured_are_top_rated() {
        let names: Vec<&str> = featured_products(Catalog::standard())
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Laptop Pro", "Smartphone X1", "Classic Watch"]);
    }
}
