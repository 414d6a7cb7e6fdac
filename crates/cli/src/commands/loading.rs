//! Loading confirmation commands.

use std::collections::BTreeMap;

use fuelops_admin::AppContext;
use fuelops_admin::AppError;
use fuelops_admin::loading::{
    LoadingError, compartments as truck_compartments, confirm_compartment_seals,
    confirm_trip_loading, generate_seal_numbers, seal_assignments,
};
use fuelops_core::TripId;

use crate::error::CliError;
use crate::output;

/// Parse a `COMPARTMENT=SEAL` pair; a bare slot number becomes `CompN`.
///
/// # Errors
///
/// Returns a message when either side is empty.
pub fn parse_seal(value: &str) -> Result<(String, String), String> {
    let (compartment, seal) = value
        .split_once('=')
        .ok_or_else(|| format!("expected COMPARTMENT=SEAL, got `{value}`"))?;
    let (compartment, seal) = (compartment.trim(), seal.trim());
    if compartment.is_empty() || seal.is_empty() {
        return Err(format!("expected COMPARTMENT=SEAL, got `{value}`"));
    }
    let label = if compartment.chars().all(|c| c.is_ascii_digit()) {
        format!("Comp{compartment}")
    } else {
        compartment.to_string()
    };
    Ok((label, seal.to_string()))
}

pub async fn confirm(ctx: &AppContext, trip_id: TripId, first_seal: Option<&str>) -> Result<(), CliError> {
    let lookup = ctx.load_lookup().await?;
    let trip = confirm_trip_loading(ctx.api(), trip_id, first_seal, &lookup).await?;
    output::line(format!("Loading confirmed for trip {}", trip.trip_num));
    output::field("Status", trip.status());
    if !trip.seal_numbers.is_empty() {
        output::field("Seals", trip.seal_numbers.join(", "));
    }
    Ok(())
}

/// Show compartments and, given a first seal, the seal each would get.
pub async fn compartments(
    ctx: &AppContext,
    trip_id: TripId,
    first_seal: Option<&str>,
) -> Result<(), CliError> {
    let trip = ctx.api().get_trip(trip_id).await?;
    let truck = trip
        .truck
        .as_ref()
        .ok_or_else(|| AppError::from(LoadingError::NoTruck(trip.trip_num.clone())))?;

    let slots = truck_compartments(truck);
    let seals = match first_seal {
        Some(first) => {
            let count = u32::try_from(slots.len()).unwrap_or(u32::MAX);
            generate_seal_numbers(first, count).map_err(AppError::from)?
        }
        None => Vec::new(),
    };
    let assigned = seal_assignments(&slots, &seals);

    output::line(format!(
        "Truck {} ({} seal slots)",
        truck.vehicle, truck.seals
    ));
    let rows: Vec<Vec<String>> = slots
        .iter()
        .map(|c| {
            vec![
                c.label.clone(),
                output::quantity(c.capacity),
                output::or_dash(assigned.get(&c.label).map(String::as_str)),
            ]
        })
        .collect();
    output::table(&["Compartment", "Capacity", "Seal"], &rows);
    Ok(())
}

pub async fn seals(ctx: &AppContext, trip_id: TripId, seals: Vec<(String, String)>) -> Result<(), CliError> {
    let seal_numbers: BTreeMap<String, String> = seals.into_iter().collect();
    let response = confirm_compartment_seals(ctx.api(), trip_id, seal_numbers).await?;
    if let Some(message) = &response.message {
        output::line(message);
    }
    if let Some(status) = &response.updated_trip_status {
        output::field("Trip status", status);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seal() {
        assert_eq!(
            parse_seal("Comp2=0102").unwrap(),
            ("Comp2".to_string(), "0102".to_string())
        );
        assert_eq!(
            parse_seal("3 = 0103").unwrap(),
            ("Comp3".to_string(), "0103".to_string())
        );
        assert!(parse_seal("Comp1").is_err());
        assert!(parse_seal("Comp1=").is_err());
    }
}
