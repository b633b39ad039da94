//! End-to-end tests for the Capstone storefront.
//!
//! Each test spawns the full storefront router (sessions, middleware and all)
//! on an ephemeral port and drives it over HTTP with a cookie-holding
//! `reqwest` client, the way a browser with htmx would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p capstone-integration-tests
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use capstone_storefront::config::StorefrontConfig;
use capstone_storefront::state::AppState;
use reqwest::{Client, Response, redirect};
use tokio::task::JoinHandle;

/// A storefront running on `127.0.0.1` for the duration of a test.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a storefront with search debouncing disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with(StorefrontConfig {
            search_debounce: Duration::ZERO,
            ..StorefrontConfig::default()
        })
        .await
    }

    /// Spawn a storefront with a specific configuration.
    pub async fn spawn_with(config: StorefrontConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = capstone_storefront::app(AppState::new(config));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self { addr, handle }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A new visitor: a client with its own cookie jar.
    #[must_use]
    pub fn visitor(&self) -> Visitor<'_> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        Visitor {
            server: self,
            client,
        }
    }

    /// A client that does not follow redirects.
    #[must_use]
    pub fn no_redirect_client() -> Client {
        Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One browser session against a [`TestServer`].
pub struct Visitor<'a> {
    server: &'a TestServer,
    client: Client,
}

impl Visitor<'_> {
    /// Plain page load.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.server.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// Page load returning the body text.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("Failed to read body")
    }

    /// htmx GET, optionally naming the triggering element.
    pub async fn htmx_get(&self, path: &str, trigger: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(self.server.url(path))
            .header("HX-Request", "true");
        if let Some(trigger) = trigger {
            request = request.header("HX-Trigger", trigger);
        }
        request.send().await.expect("htmx GET failed")
    }

    /// htmx form POST.
    pub async fn htmx_post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.server.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("htmx POST failed")
    }

    /// htmx form POST returning the body text.
    pub async fn htmx_post_text(&self, path: &str, form: &[(&str, &str)]) -> String {
        self.htmx_post(path, form)
            .await
            .text()
            .await
            .expect("Failed to read body")
    }

    /// Add one unit of `product_id` to the cart.
    pub async fn add(&self, product_id: &str) -> Response {
        self.htmx_post("/cart/add", &[("product_id", product_id)])
            .await
    }

    /// Current badge count as served by `/cart/count`.
    pub async fn badge_count(&self) -> u32 {
        self.get("/cart/count")
            .await
            .text()
            .await
            .expect("Failed to read body")
            .trim()
            .parse()
            .expect("Badge count is not a number")
    }
}

/// Footer badge markup for `count`, present on every full page.
#[must_use]
pub fn footer_badge(count: u32) -> String {
    format!("<span class=\"cart-count\">{count}</span>")
}

/// Out-of-band badge refresh markup for `count`.
#[must_use]
pub fn badge_refresh(count: u32) -> String {
    format!("<span hx-swap-oob=\"innerHTML:.cart-count\">{count}</span>")
}

/// Byte offset of `needle` in `haystack`.
#[must_use]
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in response"))
}
