//! Page resolution and the per-page layout context.
//!
//! Every page is rendered through [`Layout`], which reads the cart badge count
//! on every load. [`Page::from_path`] maps a request path to the page it
//! names, using only the terminal path segment.

use capstone_core::{Catalog, Category};

use crate::services::{CartStorage, CartStore};

/// Pages of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Catalog,
    Cart,
    Contact,
    /// A path that names no page. Nothing is activated.
    Unrecognized,
}

impl Page {
    /// Identify the page by the terminal segment of `path`.
    ///
    /// A trailing `.html` is ignored, so `/shop/cart.html` and `/cart` are
    /// both the cart page. An empty terminal segment is the home page.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segment = path.rsplit('/').next().unwrap_or("");
        let segment = segment.strip_suffix(".html").unwrap_or(segment);

        match segment {
            "" | "index" => Self::Home,
            "about" => Self::About,
            "products" => Self::Catalog,
            "cart" => Self::Cart,
            "contact" => Self::Contact,
            _ => Self::Unrecognized,
        }
    }

    /// Canonical path of the page.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Home | Self::Unrecognized => "/",
            Self::About => "/about",
            Self::Catalog => "/products",
            Self::Cart => "/cart",
            Self::Contact => "/contact",
        }
    }

    /// Short name used for nav highlighting in templates.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Catalog => "products",
            Self::Cart => "cart",
            Self::Contact => "contact",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// A single-key navigation shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardShortcut {
    pub key: char,
    pub target: Page,
}

/// Shortcuts installed on every page.
pub const SHORTCUTS: &[KeyboardShortcut] = &[KeyboardShortcut {
    key: 'c',
    target: Page::Cart,
}];

impl KeyboardShortcut {
    /// Find the shortcut bound to `key`.
    #[must_use]
    pub fn find(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        SHORTCUTS.iter().copied().find(|s| s.key == c)
    }

    /// Where the shortcut navigates to.
    #[must_use]
    pub const fn href(&self) -> &'static str {
        self.target.path()
    }

    /// Endpoint the shortcut script follows when the key is pressed.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("/shortcuts/{}", self.key)
    }
}

/// Context shared by every full-page template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub page: Page,
    /// Current cart quantity, shown in every badge on the page.
    pub cart_count: u32,
    pub shortcuts: Vec<KeyboardShortcut>,
    /// Categories linked from the footer.
    pub footer_categories: Vec<Category>,
}

impl Layout {
    /// Build the layout for `page`, reading the badge count from the store.
    pub async fn load<S: CartStorage>(page: Page, store: &CartStore<'_, S>) -> Self {
        Self::with_count(page, store.badge_count().await)
    }

    /// Build the layout with a known badge count.
    #[must_use]
    pub fn with_count(page: Page, cart_count: u32) -> Self {
        Self {
            page,
            cart_count,
            shortcuts: SHORTCUTS.to_vec(),
            footer_categories: Catalog::standard().categories(),
        }
    }

    /// Whether `name` is the active page (for nav highlighting).
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.page.name() == name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::MemoryStorage;
    use capstone_core::ProductId;

    #[test]
    fn test_page_from_terminal_segment() {
        assert_eq!(Page::from_path("/"), Page::Home);
        assert_eq!(Page::from_path(""), Page::Home);
        assert_eq!(Page::from_path("/index.html"), Page::Home);
        assert_eq!(Page::from_path("/products.html"), Page::Catalog);
        assert_eq!(Page::from_path("/products"), Page::Catalog);
        assert_eq!(Page::from_path("/shop/v2/cart.html"), Page::Cart);
        assert_eq!(Page::from_path("/contact?ref=nav"), Page::Contact);
        assert_eq!(Page::from_path("/about.html"), Page::About);
    }

    #[test]
    fn test_unrecognized_page_activates_nothing() {
        let page = Page::from_path("/blog/post-1.html");
        assert_eq!(page, Page::Unrecognized);
        assert_eq!(page.name(), "unrecognized");
    }

    #[test]
    fn test_shortcut_lookup() {
        let shortcut = KeyboardShortcut::find("c").unwrap();
        assert_eq!(shortcut.target, Page::Cart);
        assert_eq!(shortcut.href(), "/cart");
        assert_eq!(shortcut.endpoint(), "/shortcuts/c");
        assert!(KeyboardShortcut::find("x").is_none());
        assert!(KeyboardShortcut::find("cc").is_none());
        assert!(KeyboardShortcut::find("").is_none());
    }

    #[tokio::test]
    async fn test_layout_reads_badge_count() {
        let storage = MemoryStorage::new();
        let store = CartStore::new(storage, Catalog::standard());
        store.add(ProductId::new(1), 3).await.unwrap();

        let layout = Layout::load(Page::About, &store).await;
        assert_eq!(layout.cart_count, 3);
        assert!(layout.is_active("about"));
        assert!(!layout.is_active("cart"));
    }
}
