//! Shared primitives for all Rust crates in pimg.

#![forbid(unsafe_code)]

/// Authentication primitives shared across crates.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across pimg crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid caller input, rejected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Nothing matched the requested lookup.
    #[error("{0}")]
    NotFound(String),

    /// The write conflicts with state that already exists on the service.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials could not be obtained for the requested scope.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote API answered with a status outside the 2xx range.
    #[error("API error: {status_line} - {body}")]
    Http {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw status line, e.g. `403 Forbidden`.
        status_line: String,
        /// Trimmed response body.
        body: String,
    },

    /// A 2xx response body did not decode into the expected shape.
    #[error("failed to decode response ({status_line}): {reason} - {body}")]
    Decode {
        /// Raw status line of the response.
        status_line: String,
        /// Trimmed response body.
        body: String,
        /// Decoder error text.
        reason: String,
    },

    /// The caller's cancellation token fired while a call was in flight.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an HTTP status error, trimming the response body.
    #[must_use]
    pub fn http(status: u16, status_line: impl Into<String>, body: &str) -> Self {
        Self::Http {
            status,
            status_line: status_line.into(),
            body: body.trim().to_owned(),
        }
    }

    /// Builds a decode error, trimming the response body.
    #[must_use]
    pub fn decode(status_line: impl Into<String>, body: &str, reason: impl ToString) -> Self {
        Self::Decode {
            status_line: status_line.into(),
            body: body.trim().to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Returns the HTTP status code for remote status errors.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
