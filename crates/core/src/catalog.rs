//! The immutable product catalog.
//!
//! Products are defined once at startup and never mutated. The catalog is
//! also where cart entries are resolved into displayable lines: the lookup is
//! fallible, and entries with no matching product are reported back to the
//! caller instead of failing the whole join.

use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{Price, ProductId};

/// Product category. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Fashion,
    Accessories,
}

impl Category {
    /// Wire value, as used in query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Fashion => "fashion",
            Self::Accessories => "accessories",
        }
    }

    /// Human-readable label (capitalized wire value).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Fashion => "Fashion",
            Self::Accessories => "Accessories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(Self::Electronics),
            "fashion" => Ok(Self::Fashion),
            "accessories" => Ok(Self::Accessories),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Price,
    /// Average rating, 0 to 5.
    pub rating: Decimal,
    /// Image URL (externally hosted).
    pub img: String,
}

impl Product {
    fn new(id: i32, name: &str, category: Category, dollars: i64, rating: Decimal) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.to_string(),
            category,
            price: Price::usd(dollars),
            rating,
            img: format!("https://picsum.photos/400/300?random={id}"),
        }
    }
}

/// An ordered, immutable list of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

static STANDARD: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::new(vec![
        Product::new(1, "Smartphone X1", Category::Electronics, 299, Decimal::new(45, 1)),
        Product::new(2, "Laptop Pro", Category::Electronics, 899, Decimal::new(48, 1)),
        Product::new(3, "Headphones", Category::Electronics, 79, Decimal::new(41, 1)),
        Product::new(4, "Denim Jeans", Category::Fashion, 49, Decimal::new(40, 1)),
        Product::new(5, "T-Shirt", Category::Fashion, 19, Decimal::new(39, 1)),
        Product::new(6, "Classic Watch", Category::Accessories, 120, Decimal::new(43, 1)),
    ])
});

impl Catalog {
    /// Create a catalog from products in display order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The storefront's fixed six-product catalog.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Whether a product with this ID exists.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category) {
                seen.push(product.category);
            }
        }
        seen
    }

    /// Resolve each cart entry against the catalog.
    ///
    /// Lines keep cart order. Entries whose product is not in the catalog are
    /// collected in [`JoinedCart::missing`] rather than rendered.
    #[must_use]
    pub fn join<'a>(&'a self, cart: &Cart) -> JoinedCart<'a> {
        let mut lines = Vec::with_capacity(cart.len());
        let mut missing = Vec::new();

        for entry in cart.entries() {
            match self.find(entry.product_id) {
                Some(product) => lines.push(CartLine {
                    product,
                    quantity: entry.quantity,
                    subtotal: product.price.times(entry.quantity),
                }),
                None => missing.push(entry.product_id),
            }
        }

        JoinedCart { lines, missing }
    }
}

/// A cart entry resolved against its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine<'a> {
    pub product: &'a Product,
    pub quantity: u32,
    /// `product.price * quantity`
    pub subtotal: Price,
}

/// Result of [`Catalog::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedCart<'a> {
    pub lines: Vec<CartLine<'a>>,
    /// Product IDs present in the cart but absent from the catalog.
    pub missing: Vec<ProductId>,
}

impl JoinedCart<'_> {
    /// Sum of quantities over resolved lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// Whether no line resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_six_unique_products() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.products().len(), 6);

        let mut ids: Vec<_> = catalog.products().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 6);

        for product in catalog.products() {
            assert!(product.id.as_i32() > 0);
            assert!(product.price.amount >= Decimal::ZERO);
            assert!(product.rating >= Decimal::ZERO && product.rating <= Decimal::from(5));
        }
    }

    #[test]
    fn test_find() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.find(ProductId::new(3)).unwrap().name, "Headphones");
        assert!(catalog.find(ProductId::new(99)).is_none());
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        assert_eq!(
            Catalog::standard().categories(),
            vec![Category::Electronics, Category::Fashion, Category::Accessories]
        );
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("fashion".parse::<Category>().unwrap(), Category::Fashion);
        assert!("Fashion".parse::<Category>().is_err());
        assert_eq!(Category::Accessories.label(), "Accessories");
    }

    #[test]
    fn test_join_computes_subtotals_and_total() {
        let catalog = Catalog::standard();
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 2);
        cart.add(ProductId::new(1), 1);

        let joined = catalog.join(&cart);
        assert!(joined.missing.is_empty());
        assert_eq!(joined.lines.len(), 2);
        assert_eq!(joined.lines[0].product.name, "Headphones");
        assert_eq!(joined.lines[0].subtotal, Price::usd(158));
        assert_eq!(joined.item_count(), 3);
        assert_eq!(joined.total(), Price::usd(457));
    }

    #[test]
    fn test_join_reports_missing_products() {
        let catalog = Catalog::standard();
        let mut cart = Cart::new();
        cart.add(ProductId::new(42), 1);
        cart.add(ProductId::new(5), 3);

        let joined = catalog.join(&cart);
        assert_eq!(joined.missing, vec![ProductId::new(42)]);
        assert_eq!(joined.lines.len(), 1);
        assert_eq!(joined.item_count(), 3);
        assert_eq!(joined.total(), Price::usd(57));
    }
}
