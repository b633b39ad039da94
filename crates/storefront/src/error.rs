//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`.
//!
//! Responses are short HTML snippets so an htmx swap never leaves the page in
//! a broken state.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{CartStoreError, StorageError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartStoreError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Cart(CartStoreError::Storage(err))
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(CartStoreError::UnknownProduct(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Cart(CartStoreError::Storage(_)) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Client error");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Cart(CartStoreError::UnknownProduct(_)) => "That product is not available.",
            Self::NotFound(_) => "Not found.",
            Self::BadRequest(_) => "Invalid request.",
            Self::Cart(CartStoreError::Storage(_)) | Self::Render(_) => {
                "Something went wrong. Please try again."
            }
        };

        (
            self.status(),
            Html(format!("<p class=\"notice notice-error\">{message}</p>")),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
