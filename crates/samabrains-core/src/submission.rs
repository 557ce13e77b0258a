//! Contact submissions and their validation.
//!
//! A [`ContactSubmission`] can only be obtained through [`validate`], so any
//! value of that type is known to have all three fields present, within
//! bounds, and an email of the right shape. It is never persisted: it lives
//! for the duration of one request.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of the submitter's name, in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Maximum length of the submitter's email address, in characters.
pub const MAX_EMAIL_CHARS: usize = 100;
/// Maximum length of the message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Permissive `local@domain.tld` shape. Not RFC 5322.
#[allow(clippy::expect_used)]
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape pattern is a valid literal")
});

/// The fields of a contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    /// Field name as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON body posted by the contact form.
///
/// Every field is optional so that a missing key is reported as
/// [`ValidationError::MissingField`] rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    name: String,
    email: String,
    message: String,
}

impl ContactSubmission {
    /// Validate the three fields and build a submission from them.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found; see [`validate`].
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let (name, email, message) = (name.into(), email.into(), message.into());
        validate(&name, &email, &message)?;
        Ok(Self {
            name,
            email,
            message,
        })
    }

    /// The submitter's name, as submitted.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The submitter's email address, as submitted.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The message body, as submitted.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl TryFrom<ContactForm> for ContactSubmission {
    type Error = ValidationError;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        Self::new(
            form.name.unwrap_or_default(),
            form.email.unwrap_or_default(),
            form.message.unwrap_or_default(),
        )
    }
}

/// Check presence, length bounds, and email shape, in that order.
///
/// Fields are trimmed before the presence check, the same way the browser
/// form guard trims, so `"   "` counts as missing.
///
/// # Errors
///
/// - [`ValidationError::MissingField`] if any field is empty or whitespace.
/// - [`ValidationError::TooLong`] if name or email exceed 100 characters, or
///   the message exceeds 5000.
/// - [`ValidationError::InvalidEmailShape`] if the email is not `local@domain.tld`.
pub fn validate(name: &str, email: &str, message: &str) -> Result<(), ValidationError> {
    let fields = [
        (Field::Name, name, MAX_NAME_CHARS),
        (Field::Email, email, MAX_EMAIL_CHARS),
        (Field::Message, message, MAX_MESSAGE_CHARS),
    ];

    if let Some((field, _, _)) = fields.iter().find(|(_, value, _)| value.trim().is_empty()) {
        return Err(ValidationError::MissingField { field: *field });
    }

    for (field, value, max) in fields {
        let actual = value.chars().count();
        if actual > max {
            return Err(ValidationError::TooLong { field, max, actual });
        }
    }

    if !is_valid_email_shape(email) {
        return Err(ValidationError::InvalidEmailShape);
    }

    Ok(())
}

/// Whether `email` has the permissive `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email_shape(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}
