//! Contact form route handlers.
//!
//! Submissions are validated and acknowledged; nothing is transmitted.
//! A rejected submission re-renders the form with the visitor's values.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::bootstrap::{Layout, Page};
use crate::filters;
use crate::services::ContactForm;
use crate::state::AppState;
use crate::views::is_htmx_request;

/// Acknowledgment shown after a valid submission.
pub const SENT_NOTICE: &str = "Message sent - thank you!";

/// Form state: the values to show, plus at most one status line.
#[derive(Debug, Clone, Default)]
pub struct ContactFormView {
    pub form: ContactForm,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

impl ContactFormView {
    /// Validate `form` and produce the state to render.
    #[must_use]
    pub fn submit(form: ContactForm) -> Self {
        match form.validate() {
            Ok(message) => {
                tracing::info!(
                    name = %message.name,
                    email = %message.email,
                    length = message.message.len(),
                    "Contact message acknowledged"
                );
                Self {
                    form: ContactForm::default(),
                    error: None,
                    success: Some(SENT_NOTICE),
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Contact form rejected");
                Self {
                    form,
                    error: Some(e.to_string()),
                    success: None,
                }
            }
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact/show.html")]
pub struct ContactShowTemplate {
    pub layout: Layout,
    pub view: ContactFormView,
}

/// Contact form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFormTemplate {
    pub view: ContactFormView,
}

/// Display the contact page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> ContactShowTemplate {
    let store = state.cart_store(session);

    ContactShowTemplate {
        layout: Layout::load(Page::Contact, &store).await,
        view: ContactFormView::default(),
    }
}

/// Handle a contact form submission.
///
/// htmx requests get the form fragment back; plain form posts get the full
/// page.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ContactForm>,
) -> Response {
    let view = ContactFormView::submit(form);

    if is_htmx_request(&headers) {
        return ContactFormTemplate { view }.into_response();
    }

    let store = state.cart_store(session);
    ContactShowTemplate {
        layout: Layout::load(Page::Contact, &store).await,
        view,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_missing_field_preserves_values() {
        let view = ContactFormView::submit(form("Ada", "ada@example.com", "   "));
        assert_eq!(view.error.as_deref(), Some("All fields required."));
        assert_eq!(view.form.name, "Ada");
        assert_eq!(view.form.email, "ada@example.com");
        assert!(view.success.is_none());
    }

    #[test]
    fn test_invalid_email_is_reported() {
        let view = ContactFormView::submit(form("Ada", "ada@example", "Hello"));
        assert_eq!(view.error.as_deref(), Some("Enter a valid email."));
        assert_eq!(view.form.email, "ada@example");
    }

    #[test]
    fn test_success_clears_form() {
        let view = ContactFormView::submit(form(" Ada ", "ada@example.com", "Hello"));
        assert_eq!(view.success, Some(SENT_NOTICE));
        assert!(view.error.is_none());
        assert_eq!(view.form, ContactForm::default());
    }

    #[test]
    fn test_fragment_renders_submitted_values_escaped() {
        let view = ContactFormView::submit(form("<Ada>", "bad", "Hi"));
        let html = ContactFormTemplate { view }.render().unwrap();
        assert!(html.contains("&#60;Ada&#62;") || html.contains("&lt;Ada&gt;"));
        assert!(html.contains("Enter a valid email."));
        assert!(html.contains("value=\"bad\""));
    }
}
