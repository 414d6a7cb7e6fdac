//! CLI command implementations, one module per console page.

pub mod auth;
pub mod documents;
pub mod import;
pub mod loading;
pub mod orders;
pub mod reports;
pub mod trips;
