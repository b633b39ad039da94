//! Application state shared across handlers.

use std::sync::Arc;

use capstone_core::Catalog;
use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::search::Debouncer;
use crate::services::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the catalog and the search debouncer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: &'static Catalog,
    debouncer: Debouncer,
}

impl AppState {
    /// Create a new application state over the standard catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    /// Create a new application state over a specific catalog.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, catalog: &'static Catalog) -> Self {
        let debouncer = Debouncer::new(config.search_debounce);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                debouncer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &'static Catalog {
        self.inner.catalog
    }

    /// Get a reference to the catalog search debouncer.
    #[must_use]
    pub fn debouncer(&self) -> &Debouncer {
        &self.inner.debouncer
    }

    /// Cart store for the visitor owning `session`.
    #[must_use]
    pub fn cart_store(&self, session: Session) -> CartStore<'static, Session> {
        CartStore::new(session, self.inner.catalog)
    }
}
