//! Fuelops dispatch console library.
//!
//! Everything the `fuelops` command line drives lives here: the backend
//! client, the import pipeline, the order and trip view-models, trip
//! planning rules, loading confirmation, delivery documents and reports.
//!
//! The backend owns all persisted state. This crate only holds transient
//! caches and view-models that can be rebuilt from a fresh fetch.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregation;
pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod import;
pub mod loading;
pub mod lookup;
pub mod orders;
pub mod planning;
pub mod reports;
pub mod session;
pub mod state;

pub use error::AppError;
pub use state::AppContext;
