//! Core types for fuelops.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod id;
pub mod price;
pub mod status;

pub use code::{CodeError, MaterialCode, PlantCode, VehicleId, strip_leading_zeros, strip_separators};
pub use id::*;
pub use price::{CurrencyCode, Price, VatRate};
pub use status::*;
