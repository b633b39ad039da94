//! Contact form validation.
//!
//! Submissions are acknowledged in the UI only; nothing is sent anywhere.

use capstone_core::{Email, EmailError};
use serde::Deserialize;
use thiserror::Error;

/// Raw contact form fields, exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Why a submission was rejected. Only the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// A field is empty after trimming.
    #[error("All fields required.")]
    MissingField,
    /// The email is not shaped `local@domain.tld`.
    #[error("Enter a valid email.")]
    InvalidEmail(EmailError),
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

impl ContactForm {
    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// [`ContactError::MissingField`] if any field is blank, otherwise
    /// [`ContactError::InvalidEmail`] if the email is malformed.
    pub fn validate(&self) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(ContactError::MissingField);
        }

        let email = Email::parse(email).map_err(ContactError::InvalidEmail)?;

        Ok(ContactMessage {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    }
}
