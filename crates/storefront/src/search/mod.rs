//! Catalog query state and the filter pipeline.
//!
//! A [`CatalogQuery`] is built from the catalog page's query string and
//! applied to the catalog in a fixed order:
//!
//! 1. category (unless "all")
//! 2. price band (unless "all")
//! 3. search term against name or category, case-insensitive
//! 4. sort (stable; catalog order when no sort is chosen)
//!
//! Query values that cannot be parsed fall back to their defaults.

pub mod debounce;

use std::cmp::Reverse;

use capstone_core::{Catalog, Category, Product};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

pub use debounce::{Debouncer, Settled};

/// Raw query-string parameters of the catalog page.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub price: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
    /// Token identifying the catalog page instance, for search debouncing.
    pub client: Option<String>,
}

impl CatalogParams {
    /// The page instance token, if present and well-formed.
    #[must_use]
    pub fn client_token(&self) -> Option<Uuid> {
        self.client
            .as_deref()
            .and_then(|token| Uuid::parse_str(token.trim()).ok())
    }
}

/// Category dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parse a select value; unknown values mean "all".
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Self::All,
            other => other.parse().map_or_else(
                |_| {
                    tracing::debug!(category = other, "Ignoring unknown category filter");
                    Self::All
                },
                Self::Only,
            ),
        }
    }

    /// Select value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.as_str(),
        }
    }

    fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == category,
        }
    }
}

/// Price dimension: closed `[min, max]` or open-ended `min` and above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceBand {
    #[default]
    All,
    Between(Decimal, Decimal),
    AtLeast(Decimal),
}

impl PriceBand {
    /// Parse a select value: `all`, `min-max`, `min-` or `min`.
    ///
    /// A missing or zero `max` is treated as open-ended. Anything else that
    /// does not parse means "all".
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "all" {
            return Self::All;
        }

        let (min, max) = value.split_once('-').unwrap_or((value, ""));
        let Ok(min) = min.trim().parse::<Decimal>() else {
            tracing::debug!(price = value, "Ignoring unparseable price band");
            return Self::All;
        };

        match max.trim() {
            "" => Self::AtLeast(min),
            max => match max.parse::<Decimal>() {
                Ok(max) if max.is_zero() => Self::AtLeast(min),
                Ok(max) => Self::Between(min, max),
                Err(_) => {
                    tracing::debug!(price = value, "Ignoring unparseable price band");
                    Self::All
                }
            },
        }
    }

    /// Select value.
    #[must_use]
    pub fn as_param(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Between(min, max) => format!("{min}-{max}"),
            Self::AtLeast(min) => min.to_string(),
        }
    }

    fn matches(self, product: &Product) -> bool {
        let price = product.price.amount;
        match self {
            Self::All => true,
            Self::Between(min, max) => price >= min && price <= max,
            Self::AtLeast(min) => price >= min,
        }
    }
}

/// Sort dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Catalog,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    /// Parse a select value; unknown values keep catalog order.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "priceLow" => Self::PriceLow,
            "priceHigh" => Self::PriceHigh,
            "rating" => Self::Rating,
            _ => Self::Catalog,
        }
    }

    /// Select value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "default",
            Self::PriceLow => "priceLow",
            Self::PriceHigh => "priceHigh",
            Self::Rating => "rating",
        }
    }

    fn sort(self, products: &mut [&Product]) {
        match self {
            Self::Catalog => {}
            Self::PriceLow => products.sort_by_key(|p| p.price.amount),
            Self::PriceHigh => products.sort_by_key(|p| Reverse(p.price.amount)),
            Self::Rating => products.sort_by_key(|p| Reverse(p.rating)),
        }
    }
}

/// The four query dimensions of the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub price: PriceBand,
    pub sort: SortKey,
    /// Trimmed search term; empty means no search.
    pub search: String,
}

impl CatalogQuery {
    /// Build a query from raw parameters, defaulting anything missing.
    #[must_use]
    pub fn from_params(params: &CatalogParams) -> Self {
        Self {
            category: params
                .category
                .as_deref()
                .map_or_else(CategoryFilter::default, CategoryFilter::parse),
            price: params
                .price
                .as_deref()
                .map_or_else(PriceBand::default, PriceBand::parse),
            sort: params
                .sort
                .as_deref()
                .map_or_else(SortKey::default, SortKey::parse),
            search: params.q.as_deref().unwrap_or("").trim().to_string(),
        }
    }

    fn matches_search(&self, product: &Product) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product.category.as_str().to_lowercase().contains(&needle)
    }
}

/// Run the filter pipeline over `catalog`.
#[must_use]
pub fn apply_filters<'a>(catalog: &'a Catalog, query: &CatalogQuery) -> Vec<&'a Product> {
    let mut products: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| query.category.matches(p))
        .filter(|p| query.price.matches(p))
        .filter(|p| query.matches_search(p))
        .collect();

    query.sort.sort(&mut products);
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn names(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.name.clone()).collect()
    }

    fn query(category: &str, price: &str, sort: &str, q: &str) -> CatalogQuery {
        CatalogQuery::from_params(&CatalogParams {
            category: Some(category.to_string()),
            price: Some(price.to_string()),
            sort: Some(sort.to_string()),
            q: Some(q.to_string()),
            client: None,
        })
    }

    #[test]
    fn test_default_query_returns_catalog_order() {
        let result = apply_filters(Catalog::standard(), &CatalogQuery::default());
        assert_eq!(
            names(&result),
            vec![
                "Smartphone X1",
                "Laptop Pro",
                "Headphones",
                "Denim Jeans",
                "T-Shirt",
                "Classic Watch"
            ]
        );
    }

    #[test]
    fn test_electronics_by_price_low() {
        let result = apply_filters(
            Catalog::standard(),
            &query("electronics", "all", "priceLow", ""),
        );
        assert_eq!(
            names(&result),
            vec!["Headphones", "Smartphone X1", "Laptop Pro"]
        );
        let prices: Vec<String> = result.iter().map(|p| p.price.display()).collect();
        assert_eq!(prices, vec!["$79.00", "$299.00", "$899.00"]);
    }

    #[test]
    fn test_price_high_and_rating_sorts() {
        let catalog = Catalog::standard();
        assert_eq!(
            names(&apply_filters(catalog, &query("all", "all", "priceHigh", "")))[..2],
            ["Laptop Pro", "Smartphone X1"]
        );
        assert_eq!(
            names(&apply_filters(catalog, &query("all", "all", "rating", ""))),
            vec![
                "Laptop Pro",
                "Smartphone X1",
                "Classic Watch",
                "Headphones",
                "Denim Jeans",
                "T-Shirt"
            ]
        );
    }

    #[test]
    fn test_closed_price_band_is_inclusive() {
        let result = apply_filters(Catalog::standard(), &query("all", "49-120", "default", ""));
        assert_eq!(
            names(&result),
            vec!["Headphones", "Denim Jeans", "Classic Watch"]
        );
    }

    #[test]
    fn test_open_price_band() {
        let result = apply_filters(Catalog::standard(), &query("all", "500", "default", ""));
        assert_eq!(names(&result), vec!["Laptop Pro"]);

        assert_eq!(PriceBand::parse("200-"), PriceBand::AtLeast(Decimal::from(200)));
        assert_eq!(PriceBand::parse("200-0"), PriceBand::AtLeast(Decimal::from(200)));
        assert_eq!(PriceBand::parse("cheap"), PriceBand::All);
        assert_eq!(
            PriceBand::parse("50-200"),
            PriceBand::Between(Decimal::from(50), Decimal::from(200))
        );
    }

    #[test]
    fn test_search_matches_name_or_category_case_insensitively() {
        let catalog = Catalog::standard();
        assert_eq!(
            names(&apply_filters(catalog, &query("all", "all", "default", "  LAPTOP "))),
            vec!["Laptop Pro"]
        );
        assert_eq!(
            names(&apply_filters(catalog, &query("all", "all", "default", "fash"))),
            vec!["Denim Jeans", "T-Shirt"]
        );
    }

    #[test]
    fn test_filters_are_and_combined() {
        let result = apply_filters(
            Catalog::standard(),
            &query("electronics", "0-100", "default", "phone"),
        );
        assert_eq!(names(&result), vec!["Headphones"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let result = apply_filters(Catalog::standard(), &query("fashion", "500", "default", ""));
        assert!(result.is_empty());
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let catalog = Catalog::standard();
        let q = query("all", "0-300", "rating", "o");
        assert_eq!(apply_filters(catalog, &q), apply_filters(catalog, &q));
    }

    #[test]
    fn test_unknown_values_fall_back_to_defaults() {
        let q = query("garden", "", "newest", "");
        assert_eq!(q, CatalogQuery::default());
        assert_eq!(CatalogQuery::from_params(&CatalogParams::default()), CatalogQuery::default());
    }

    #[test]
    fn test_param_round_trip_for_select_values() {
        assert_eq!(PriceBand::parse(&PriceBand::parse("0-50").as_param()), PriceBand::parse("0-50"));
        assert_eq!(SortKey::parse(SortKey::Rating.as_str()), SortKey::Rating);
        assert_eq!(
            CategoryFilter::parse("accessories").as_str(),
            "accessories"
        );
    }

    #[test]
    fn test_client_token_parsing() {
        let token = Uuid::new_v4();
        let params = CatalogParams {
            client: Some(token.to_string()),
            ..CatalogParams::default()
        };
        assert_eq!(params.client_token(), Some(token));

        let params = CatalogParams {
            client: Some("not-a-token".to_string()),
            ..CatalogParams::default()
        };
        assert_eq!(params.client_token(), None);
        assert_eq!(CatalogParams::default().client_token(), None);
    }
}
