//! Errors surfaced by CLI commands.

use std::path::PathBuf;

use fuelops_admin::AppError;
use fuelops_admin::api::ApiError;
use fuelops_admin::import::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Whether the stored session was rejected.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::App(e) if e.requires_login())
    }
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        Self::App(error.into())
    }
}

impl From<ImportError> for CliError {
    fn from(error: ImportError) -> Self {
        Self::App(error.into())
    }
}
