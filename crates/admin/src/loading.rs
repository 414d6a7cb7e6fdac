//! Loading confirmation at the depot.
//!
//! Bulk (VRAC) trips are sealed compartment by compartment. The operator
//! enters the first seal number and the rest follow sequentially, one per
//! seal slot of the truck. Bulk products must have their density and
//! loading temperature on file before a trip can be confirmed.

use std::collections::BTreeMap;

use fuelops_core::{OrderRegime, TripId, TripStatus};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{
    ApiClient, ConfirmLoadingRequest, ConfirmLoadingResponse, Order, Trip, TripLoadingUpdate, Truck,
};
use crate::error::AppError;
use crate::lookup::LookupCache;

/// Digits of a printed seal number.
pub const SEAL_WIDTH: usize = 4;

/// Status sent with per-compartment seal confirmation.
pub const LOADING_CONFIRMED: &str = "Loading Confirmed";

/// Rules that block a loading confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadingError {
    #[error("No orders found for this trip.")]
    NoOrders,

    #[error("Please enter the first seal number for VRAC orders.")]
    MissingFirstSeal,

    #[error("Seal number \"{0}\" is not a number.")]
    InvalidSeal(String),

    #[error("Trip {0} has no truck on record.")]
    NoTruck(String),

    #[error("Some VRAC products are missing density or temperature information: {}", .0.join(", "))]
    IncompleteProducts(Vec<String>),

    #[error("Seal numbers are required for loading confirmation.")]
    SealsRequired,
}

/// Sequential seal numbers, zero-padded to [`SEAL_WIDTH`] digits.
///
/// # Errors
///
/// Returns [`LoadingError::InvalidSeal`] if `first` is not a whole number,
/// or if the sequence would run past the largest representable seal.
pub fn generate_seal_numbers(first: &str, count: u32) -> Result<Vec<String>, LoadingError> {
    let invalid = || LoadingError::InvalidSeal(first.to_string());
    let start: u64 = first.trim().parse().map_err(|_| invalid())?;
    (0..u64::from(count))
        .map(|i| {
            start
                .checked_add(i)
                .map(|n| format!("{n:0width$}", width = SEAL_WIDTH))
                .ok_or_else(invalid)
        })
        .collect()
}

/// A truck compartment.
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    /// `Comp1` to `Comp9`.
    pub label: String,
    pub capacity: f64,
}

/// Compartments with a capacity, in slot order.
#[must_use]
pub fn compartments(truck: &Truck) -> Vec<Compartment> {
    truck
        .compartment_capacities()
        .iter()
        .enumerate()
        .filter(|(_, capacity)| **capacity > 0.0)
        .map(|(i, capacity)| Compartment {
            label: format!("Comp{}", i + 1),
            capacity: *capacity,
        })
        .collect()
}

/// Pair compartments with seal numbers, in order.
#[must_use]
pub fn seal_assignments(compartments: &[Compartment], seals: &[String]) -> BTreeMap<String, String> {
    compartments
        .iter()
        .zip(seals)
        .map(|(c, s)| (c.label.clone(), s.clone()))
        .collect()
}

/// Whether a trip carries bulk product, judged by its first line.
#[must_use]
pub fn is_bulk(trip: &Trip) -> bool {
    trip.orders.first().and_then(|o| o.regime) == Some(OrderRegime::Vrac)
}

/// Bulk lines whose product lacks density or temperature.
#[must_use]
pub fn incomplete_products(trip: &Trip, lookup: &LookupCache) -> Vec<String> {
    let mut missing: Vec<String> = trip
        .orders
        .iter()
        .filter(|o| o.regime == Some(OrderRegime::Vrac))
        .filter(|o| !has_loading_data(o, lookup))
        .map(|o| o.material_code.clone())
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

fn has_loading_data(order: &Order, lookup: &LookupCache) -> bool {
    lookup
        .product(&order.material_code)
        .or(order.product.as_ref())
        .is_some_and(|p| p.density.is_some() && p.temp.is_some())
}

/// Check a trip and build its loading update.
///
/// # Errors
///
/// Returns the first rule the trip breaks.
pub fn prepare_loading(
    trip: &Trip,
    first_seal: Option<&str>,
    lookup: &LookupCache,
) -> Result<TripLoadingUpdate, LoadingError> {
    if trip.orders.is_empty() {
        return Err(LoadingError::NoOrders);
    }

    let mut seal_numbers = Vec::new();
    if is_bulk(trip) {
        let first = first_seal
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(LoadingError::MissingFirstSeal)?;
        let missing = incomplete_products(trip, lookup);
        if !missing.is_empty() {
            return Err(LoadingError::IncompleteProducts(missing));
        }
        let truck = trip
            .truck
            .as_ref()
            .ok_or_else(|| LoadingError::NoTruck(trip.trip_num.clone()))?;
        seal_numbers = generate_seal_numbers(first, truck.seals)?;
    }

    Ok(TripLoadingUpdate {
        status: TripStatus::Completed,
        seal_numbers,
    })
}

/// Confirm loading of a trip: seals for bulk trips, status `Completed`.
///
/// # Errors
///
/// Returns a loading error before any update, or the backend error.
#[instrument(skip(api, lookup), fields(trip_id = %trip_id))]
pub async fn confirm_trip_loading(
    api: &ApiClient,
    trip_id: TripId,
    first_seal: Option<&str>,
    lookup: &LookupCache,
) -> Result<Trip, AppError> {
    let trip = api.get_trip(trip_id).await?;
    let update = prepare_loading(&trip, first_seal, lookup)?;
    let updated = api.update_trip_loading(trip_id, &update).await?;
    debug!(seals = update.seal_numbers.len(), "Loading confirmed");
    Ok(updated)
}

/// Confirm loading with explicit per-compartment seal numbers.
///
/// # Errors
///
/// Returns [`LoadingError::SealsRequired`] for an empty map, or the backend
/// error.
#[instrument(skip(api, seal_numbers), fields(trip_id = %trip_id, seals = seal_numbers.len()))]
pub async fn confirm_compartment_seals(
    api: &ApiClient,
    trip_id: TripId,
    seal_numbers: BTreeMap<String, String>,
) -> Result<ConfirmLoadingResponse, AppError> {
    if seal_numbers.is_empty() {
        return Err(LoadingError::SealsRequired.into());
    }
    let request = ConfirmLoadingRequest {
        seal_numbers,
        status: LOADING_CONFIRMED.to_string(),
    };
    let mut response = api.confirm_loading(trip_id, &request).await?;
    if response.message.is_none() {
        response.message = Some("Loading confirmation processed.".to_string());
    }
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{Product, ReferenceData};

    fn bulk_line(material: &str) -> Order {
        Order {
            sales_order: "4500012".to_string(),
            material_code: material.to_string(),
            quantity: 15000.0,
            regime: Some(OrderRegime::Vrac),
            ..Order::default()
        }
    }

    fn bulk_trip() -> Trip {
        Trip {
            trip_num: "55".to_string(),
            orders: vec![bulk_line("200123"), bulk_line("200123")],
            truck: Some(Truck {
                vehicle: "12345A6".to_string(),
                seals: 3,
                comp1: 10000.0,
                comp3: 20000.0,
                ..Truck::default()
            }),
            ..Trip::default()
        }
    }

    fn lookup(density: Option<f64>) -> LookupCache {
        LookupCache::new(ReferenceData {
            products: vec![Product {
                material: "200123".to_string(),
                density,
                temp: Some(15.0),
                ..Product::default()
            }],
            ..ReferenceData::default()
        })
    }

    #[test]
    fn test_seal_numbers_are_sequential_and_padded() {
        assert_eq!(
            generate_seal_numbers("0098", 4).unwrap(),
            vec!["0098", "0099", "0100", "0101"]
        );
        assert_eq!(generate_seal_numbers("12345", 1).unwrap(), vec!["12345"]);
        assert!(generate_seal_numbers("12345", 0).unwrap().is_empty());
        assert_eq!(
            generate_seal_numbers("A12", 2).unwrap_err(),
            LoadingError::InvalidSeal("A12".to_string())
        );
    }

    #[test]
    fn test_seal_numbers_stop_at_largest_seal() {
        let last = u64::MAX.to_string();
        assert_eq!(generate_seal_numbers(&last, 1).unwrap(), vec![last.clone()]);
        assert_eq!(
            generate_seal_numbers(&last, 2).unwrap_err(),
            LoadingError::InvalidSeal(last)
        );
    }

    #[test]
    fn test_compartments_skip_empty_slots() {
        let trip = bulk_trip();
        let comps = compartments(trip.truck.as_ref().unwrap());
        let labels: Vec<&str> = comps.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Comp1", "Comp3"]);

        let seals = vec!["0001".to_string(), "0002".to_string()];
        let map = seal_assignments(&comps, &seals);
        assert_eq!(map.get("Comp3").map(String::as_str), Some("0002"));
    }

    #[test]
    fn test_bulk_trip_needs_first_seal() {
        let err = prepare_loading(&bulk_trip(), None, &lookup(Some(0.84))).unwrap_err();
        assert_eq!(err, LoadingError::MissingFirstSeal);
    }

    #[test]
    fn test_bulk_products_need_density_and_temperature() {
        let err = prepare_loading(&bulk_trip(), Some("0100"), &lookup(None)).unwrap_err();
        assert_eq!(err, LoadingError::IncompleteProducts(vec!["200123".to_string()]));
    }

    #[test]
    fn test_bulk_update_carries_seals() {
        let update = prepare_loading(&bulk_trip(), Some("0100"), &lookup(Some(0.84))).unwrap();
        assert_eq!(update.status, TripStatus::Completed);
        assert_eq!(update.seal_numbers, vec!["0100", "0101", "0102"]);
    }

    #[test]
    fn test_packaged_trip_has_no_seals() {
        let mut trip = bulk_trip();
        for line in &mut trip.orders {
            line.regime = Some(OrderRegime::Pack);
        }
        let update = prepare_loading(&trip, None, &LookupCache::default()).unwrap();
        assert!(update.seal_numbers.is_empty());
    }

    #[test]
    fn test_empty_trip_is_a_hard_stop() {
        let trip = Trip::default();
        assert_eq!(
            prepare_loading(&trip, Some("1"), &LookupCache::default()).unwrap_err(),
            LoadingError::NoOrders
        );
    }
}
