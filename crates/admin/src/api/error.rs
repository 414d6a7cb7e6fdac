//! Backend API error types.

use thiserror::Error;

use crate::session::SessionError;

/// Route the console sends the user to after a 401.
pub const LOGIN_ROUTE: &str = "/login";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is missing or expired. The stored token has already been
    /// cleared; the user must log in again at `redirect`.
    #[error("Unauthorized: please log in again ({redirect})")]
    Unauthorized { redirect: &'static str },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session token could not be updated.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Whether this error means the user has to log in again.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display_mentions_login() {
        let err = ApiError::Unauthorized {
            redirect: LOGIN_ROUTE,
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthorized: please log in again (/login)");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 422,
            message: "bad row".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - bad row");
        assert!(!err.is_unauthorized());
    }
}
