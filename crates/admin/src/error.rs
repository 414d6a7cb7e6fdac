//! Unified error handling for the console.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::documents::DocumentError;
use crate::import::ImportError;
use crate::loading::LoadingError;
use crate::orders::FieldError;
use crate::planning::PlanningError;
use crate::reports::ReportError;
use crate::session::SessionError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Stored session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Import was rejected or aborted.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Trip planning rule violated.
    #[error("{0}")]
    Planning(#[from] PlanningError),

    /// Loading confirmation rule violated.
    #[error("{0}")]
    Loading(#[from] LoadingError),

    /// Document could not be generated.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Report could not be produced.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Form input failed validation.
    #[error("Invalid input: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether the user has to log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LOGIN_ROUTE;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("trip 12".to_string());
        assert_eq!(err.to_string(), "Not found: trip 12");

        let err = AppError::Validation(vec![
            FieldError::new("Customer", "Customer is required."),
            FieldError::new("Order Qty", "Order quantity must be a positive number."),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid input: Customer is required.; Order quantity must be a positive number."
        );
    }

    #[test]
    fn test_requires_login() {
        let err = AppError::from(ApiError::Unauthorized {
            redirect: LOGIN_ROUTE,
        });
        assert!(err.requires_login());
        assert!(!AppError::NotFound("x".to_string()).requires_login());
    }
}
