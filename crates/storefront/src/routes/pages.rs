//! Static page handlers, page resolution for unrouted paths, and keyboard
//! shortcut redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::bootstrap::{KeyboardShortcut, Layout, Page};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;
use crate::views::{HX_REDIRECT, is_htmx_request};

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
    pub path: String,
}

/// Display the about page.
#[instrument(skip(state, session))]
pub async fn about(State(state): State<AppState>, session: Session) -> AboutTemplate {
    let store = state.cart_store(session);

    AboutTemplate {
        layout: Layout::load(Page::About, &store).await,
    }
}

/// Resolve a path no route matched.
///
/// The page is identified by the terminal path segment, so legacy paths such
/// as `/shop/cart.html` redirect to the canonical page. Anything else gets
/// the not-found page, which still shows the cart badge.
#[instrument(skip(state, session))]
pub async fn fallback(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let page = Page::from_path(uri.path());

    if page != Page::Unrecognized {
        tracing::debug!(path = uri.path(), target = page.path(), "Resolved page by terminal segment");
        return Redirect::permanent(page.path()).into_response();
    }

    let store = state.cart_store(session);
    let template = NotFoundTemplate {
        layout: Layout::load(page, &store).await,
        path: uri.path().to_string(),
    };

    (StatusCode::NOT_FOUND, template).into_response()
}

/// Follow a keyboard shortcut.
///
/// htmx requests get an `HX-Redirect`; plain requests a `303 See Other`.
///
/// # Errors
///
/// Returns 404 if no shortcut is bound to `key`.
#[instrument(skip(headers))]
pub async fn shortcut(Path(key): Path<String>, headers: HeaderMap) -> Result<Response> {
    let shortcut = KeyboardShortcut::find(&key)
        .ok_or_else(|| AppError::NotFound(format!("shortcut {key}")))?;

    if is_htmx_request(&headers) {
        return Ok(([(HX_REDIRECT, shortcut.href())], StatusCode::OK).into_response());
    }

    Ok(Redirect::to(shortcut.href()).into_response())
}
