//! Trip planning commands.
//!
//! # Usage
//!
//! ```bash
//! fuelops trips candidates
//! fuelops trips trucks 4500012 4500013
//! fuelops trips create -v 12345-A-6 -d 2024-05-02 4500012 4500013
//! fuelops trips assign 12 381
//! ```

use fuelops_admin::AppContext;
use fuelops_admin::AppError;
use fuelops_admin::aggregation::OrderGroup;
use fuelops_admin::api::{OrderFilter, Page, Trip};
use fuelops_admin::planning::{
    PlanningError, Selection, TripDetails, assign_order, available_trucks, candidate_orders,
    create_trip, remove_order, update_trip_status, utilization,
};
use fuelops_core::{OrderId, TripId, TripStatus};

use crate::error::CliError;
use crate::output;

async fn candidates_from_backend(ctx: &AppContext) -> Result<Vec<OrderGroup>, CliError> {
    let orders = ctx.api().list_orders(&OrderFilter::default()).await?;
    Ok(candidate_orders(orders))
}

/// Combine the named sales orders into one selection.
fn select(groups: &[OrderGroup], sales_orders: &[String]) -> Result<Selection, CliError> {
    let picked = sales_orders
        .iter()
        .map(|key| {
            groups
                .iter()
                .find(|g| g.key == key.trim())
                .ok_or_else(|| AppError::NotFound(format!("sales order {key} is not waiting for a trip")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Selection::new(&picked).map_err(AppError::from)?)
}

fn trip_row(trip: &Trip) -> Vec<String> {
    vec![
        trip.id.map(|id| id.to_string()).unwrap_or_default(),
        trip.trip_num.clone(),
        output::or_dash(trip.vehicle_id.as_deref()),
        output::or_dash(trip.driver_name.as_deref()),
        output::or_dash(trip.tour_start_date.as_deref()),
        trip.status().to_string(),
        trip.orders.len().to_string(),
        output::quantity(trip.total_quantity()),
    ]
}

const TRIP_HEADERS: [&str; 8] = ["ID", "Trip", "Vehicle", "Driver", "Start", "Status", "Lines", "Qty"];

pub async fn list(ctx: &AppContext, page: u32, limit: u32) -> Result<(), CliError> {
    let result = ctx.api().list_trips(Page { page, limit }).await?;
    if result.trips.is_empty() {
        output::line("No trips found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = result.trips.iter().map(trip_row).collect();
    output::table(&TRIP_HEADERS, &rows);
    output::line(format!("Page {page} ({} trips in total)", result.total_count));
    Ok(())
}

fn print_trip(trip: &Trip) {
    output::line(format!("Trip {}", trip.trip_num));
    output::field("Vehicle", output::or_dash(trip.vehicle_id.as_deref()));
    output::field("Driver", output::or_dash(trip.driver_name.as_deref()));
    output::field("Driver CIN", output::or_dash(trip.driver_cin.as_deref()));
    output::field("Haulier", output::or_dash(trip.org_name.as_deref()));
    output::field("Tour start", output::or_dash(trip.tour_start_date.as_deref()));
    output::field("Status", trip.status());
    if let Some(truck) = &trip.truck {
        output::field(
            "Load",
            format!(
                "{} of {} ({:.0}%)",
                output::quantity(trip.total_quantity()),
                output::quantity(truck.capacity),
                utilization(trip.total_quantity(), truck.capacity)
            ),
        );
    }
    if !trip.seal_numbers.is_empty() {
        output::field("Seals", trip.seal_numbers.join(", "));
    }

    let rows: Vec<Vec<String>> = trip
        .orders
        .iter()
        .map(|o| {
            vec![
                o.id.map(|id| id.to_string()).unwrap_or_default(),
                o.sales_order.clone(),
                output::or_dash(o.item.as_deref()),
                o.customer_name.clone().unwrap_or_else(|| o.customer.clone()),
                o.material_code.clone(),
                output::quantity(o.quantity),
            ]
        })
        .collect();
    output::heading("Lines");
    output::table(&["ID", "Sales Order", "Item", "Customer", "Material", "Qty"], &rows);
}

pub async fn show(ctx: &AppContext, trip_id: TripId) -> Result<(), CliError> {
    let trip = ctx.api().get_trip(trip_id).await?;
    print_trip(&trip);
    Ok(())
}

pub async fn candidates(ctx: &AppContext) -> Result<(), CliError> {
    let groups = candidates_from_backend(ctx).await?;
    if groups.is_empty() {
        output::line("Every order is on a trip.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            vec![
                g.key.clone(),
                g.customer_name().unwrap_or(g.customer()).to_string(),
                g.plant().to_string(),
                g.regime().map(|r| r.to_string()).unwrap_or_default(),
                g.lines.len().to_string(),
                output::quantity(g.total_quantity),
            ]
        })
        .collect();
    output::table(&["Sales Order", "Customer", "Plant", "Regime", "Lines", "Qty"], &rows);
    Ok(())
}

/// List trucks able to carry the selection, with their utilization.
pub async fn trucks(ctx: &AppContext, sales_orders: &[String]) -> Result<(), CliError> {
    let groups = candidates_from_backend(ctx).await?;
    let selection = select(&groups, sales_orders)?;
    let lookup = ctx.load_lookup().await?;
    let fitting = available_trucks(lookup.trucks(), &selection);

    output::line(format!(
        "{} {} over {} lines",
        output::quantity(selection.total_quantity),
        selection.required_regime(),
        selection.lines.len()
    ));
    if fitting.is_empty() {
        output::line("No truck can take this load.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = fitting
        .iter()
        .map(|t| {
            let pct = utilization(selection.total_quantity, t.capacity);
            vec![
                t.vehicle.clone(),
                output::quantity(t.capacity),
                format!("{pct:.0}%"),
                output::or_dash(t.driver_name.as_deref()),
                output::or_dash(t.haulier_name.as_deref()),
                if selection.total_quantity < t.capacity {
                    "not full".to_string()
                } else {
                    "ready".to_string()
                },
            ]
        })
        .collect();
    output::table(&["Vehicle", "Capacity", "Load", "Driver", "Haulier", "Dispatch"], &rows);
    Ok(())
}

pub async fn create(
    ctx: &AppContext,
    vehicle: &str,
    details: TripDetails,
    sales_orders: &[String],
) -> Result<(), CliError> {
    let groups = candidates_from_backend(ctx).await?;
    let selection = select(&groups, sales_orders)?;
    let lookup = ctx.load_lookup().await?;
    let truck = lookup
        .truck(vehicle)
        .ok_or_else(|| AppError::from(PlanningError::UnknownTruck(vehicle.to_string())))?;

    let trip = create_trip(ctx.api(), &selection, truck, details).await?;
    output::line(format!(
        "Trip {} created for {} ({} lines, {})",
        trip.trip_num,
        truck.vehicle,
        selection.lines.len(),
        output::quantity(selection.total_quantity)
    ));
    Ok(())
}

pub async fn assign(ctx: &AppContext, trip_id: TripId, order_id: OrderId) -> Result<(), CliError> {
    let trip = assign_order(ctx.api(), trip_id, order_id).await?;
    output::line(format!(
        "Order line {order_id} is on trip {} ({} lines)",
        trip.trip_num,
        trip.orders.len()
    ));
    Ok(())
}

pub async fn remove(ctx: &AppContext, trip_id: TripId, order_id: OrderId) -> Result<(), CliError> {
    let trip = remove_order(ctx.api(), trip_id, order_id).await?;
    output::line(format!(
        "Order line {order_id} removed from trip {} ({} lines left)",
        trip.trip_num,
        trip.orders.len()
    ));
    Ok(())
}

pub async fn set_status(ctx: &AppContext, trip_id: TripId, status: TripStatus) -> Result<(), CliError> {
    let trip = update_trip_status(ctx.api(), trip_id, status).await?;
    output::line(format!("Trip {} is now {}", trip.trip_num, trip.status()));
    Ok(())
}

pub async fn delete(ctx: &AppContext, trip_id: TripId) -> Result<(), CliError> {
    ctx.api().delete_trip(trip_id).await?;
    output::line(format!("Trip {trip_id} deleted"));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fuelops_admin::aggregation::group_by_sales_order;
    use fuelops_admin::api::Order;
    use fuelops_core::OrderRegime;

    use super::*;

    fn line(sales_order: &str, qty: f64, regime: OrderRegime) -> Order {
        Order {
            sales_order: sales_order.to_string(),
            customer: "100234".to_string(),
            quantity: qty,
            regime: Some(regime),
            ..Order::default()
        }
    }

    #[test]
    fn test_select_combines_named_orders() {
        let groups = group_by_sales_order(vec![
            line("SO1", 12000.0, OrderRegime::Vrac),
            line("SO2", 18000.0, OrderRegime::Vrac),
            line("SO3", 500.0, OrderRegime::Pack),
        ]);
        let selection = select(&groups, &["SO1".to_string(), " SO2 ".to_string()]).unwrap();
        assert_eq!(selection.lines.len(), 2);
        assert!((selection.total_quantity - 30000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_rejects_unknown_and_mixed() {
        let groups = group_by_sales_order(vec![
            line("SO1", 12000.0, OrderRegime::Vrac),
            line("SO3", 500.0, OrderRegime::Pack),
        ]);
        assert!(matches!(
            select(&groups, &["SO9".to_string()]),
            Err(CliError::App(AppError::NotFound(_)))
        ));
        assert!(matches!(
            select(&groups, &["SO1".to_string(), "SO3".to_string()]),
            Err(CliError::App(AppError::Planning(PlanningError::MixedRegimes)))
        ));
    }
}
