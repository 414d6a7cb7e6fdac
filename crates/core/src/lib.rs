//! Fuelops Core - Shared types library.
//!
//! This crate provides common types used across all fuelops components:
//! - `admin` - Dispatch console library (API client, import pipeline, documents)
//! - `cli` - The `fuelops` command-line console
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, business codes, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
