//! Trip planning rules.
//!
//! A trip takes whole sales orders that are not yet on a trip, all of one
//! regime, and a truck of that regime. The truck leaves full: the selected
//! quantity must equal its capacity exactly, no less and no more.

use chrono::NaiveDate;
use fuelops_core::{OrderId, OrderRegime, TripId, TripStatus};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::aggregation::{OrderGroup, group_by_sales_order};
use crate::api::{ApiClient, CreateTripRequest, Order, Trip, Truck};
use crate::error::AppError;

/// Business rules that block a trip.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("You cannot mix PACK and VRAC orders in the same trip.")]
    MixedRegimes,

    #[error("Please select a truck, tour start date, and at least one order.")]
    NothingSelected,

    #[error("Vehicle \"{0}\" not found in trucks")]
    UnknownTruck(String),

    #[error("Truck {vehicle} carries {truck} loads and cannot take {orders} orders.")]
    RegimeMismatch {
        vehicle: String,
        truck: OrderRegime,
        orders: OrderRegime,
    },

    #[error("The truck must be at 100% capacity before it can be dispatched. ({total} of {capacity})")]
    UnderCapacity { total: f64, capacity: f64 },

    #[error("Selected quantity {total} exceeds truck capacity {capacity}.")]
    OverCapacity { total: f64, capacity: f64 },

    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("At least one order must be assigned to the trip.")]
    NoOrders,

    #[error("Order line {0} has no id.")]
    MissingOrderId(String),

    #[error("Order {order} is already on trip {trip}.")]
    AlreadyAssigned { order: OrderId, trip: String },
}

/// Truck utilization in percent; zero for a truck without capacity.
#[must_use]
pub fn utilization(total: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        total / capacity * 100.0
    } else {
        0.0
    }
}

/// Orders still waiting for a trip, grouped by sales order.
pub fn candidate_orders(orders: impl IntoIterator<Item = Order>) -> Vec<OrderGroup> {
    group_by_sales_order(orders.into_iter().filter(|o| !o.is_assigned()))
}

/// Sales orders picked for one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub lines: Vec<Order>,
    pub total_quantity: f64,
    pub regime: Option<OrderRegime>,
}

impl Selection {
    /// Combine sales orders into one trip load.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::MixedRegimes`] when the orders mix VRAC and
    /// PACK, and [`PlanningError::NothingSelected`] when nothing is picked.
    pub fn new(groups: &[&OrderGroup]) -> Result<Self, PlanningError> {
        if groups.iter().all(|g| g.lines.is_empty()) {
            return Err(PlanningError::NothingSelected);
        }
        let mut regimes = groups.iter().filter_map(|g| g.regime());
        let regime = regimes.next();
        if let Some(first) = regime
            && regimes.any(|r| r != first)
        {
            return Err(PlanningError::MixedRegimes);
        }

        let lines: Vec<Order> = groups.iter().flat_map(|g| g.lines.iter().cloned()).collect();
        let total_quantity = lines.iter().map(|o| o.quantity).sum();
        Ok(Self {
            lines,
            total_quantity,
            regime,
        })
    }

    /// Regime the truck must serve; bulk unless the orders are packaged.
    #[must_use]
    pub fn required_regime(&self) -> OrderRegime {
        self.regime.unwrap_or(OrderRegime::Vrac)
    }
}

/// Trucks able to take a selection: same regime and enough capacity.
///
/// Sorted by capacity, smallest first.
pub fn available_trucks<'a>(
    trucks: impl IntoIterator<Item = &'a Truck>,
    selection: &Selection,
) -> Vec<&'a Truck> {
    let regime = selection.required_regime();
    let mut fitting: Vec<&Truck> = trucks
        .into_iter()
        .filter(|t| t.regime() == regime && t.capacity >= selection.total_quantity)
        .collect();
    fitting.sort_by(|a, b| {
        a.capacity
            .total_cmp(&b.capacity)
            .then_with(|| a.vehicle.cmp(&b.vehicle))
    });
    fitting
}

/// Driver and date chosen for a trip; blanks fall back to the truck record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripDetails {
    pub tour_start_date: Option<NaiveDate>,
    pub driver_name: Option<String>,
    pub driver_cin: Option<String>,
}

/// Build the trip creation request, enforcing every dispatch rule.
///
/// # Errors
///
/// Returns the first rule the plan breaks.
pub fn build_trip_request(
    selection: &Selection,
    truck: &Truck,
    details: TripDetails,
) -> Result<CreateTripRequest, PlanningError> {
    let Some(tour_start_date) = details.tour_start_date else {
        return Err(PlanningError::NothingSelected);
    };
    if selection.lines.is_empty() {
        return Err(PlanningError::NothingSelected);
    }

    let orders = selection.required_regime();
    if truck.regime() != orders {
        return Err(PlanningError::RegimeMismatch {
            vehicle: truck.vehicle.clone(),
            truck: truck.regime(),
            orders,
        });
    }

    check_capacity(selection.total_quantity, truck.capacity)?;

    let order_ids = selection
        .lines
        .iter()
        .map(|o| o.id.ok_or_else(|| PlanningError::MissingOrderId(line_label(o))))
        .collect::<Result<Vec<_>, _>>()?;

    let driver_name = pick(details.driver_name, truck.driver_name.as_deref())
        .ok_or(PlanningError::MissingField("Driver Name"))?;
    let driver_cin = pick(details.driver_cin, truck.driver_cin.as_deref()).unwrap_or_default();

    Ok(CreateTripRequest {
        vehicle_id: truck.vehicle.clone(),
        tour_start_date,
        order_ids,
        status: TripStatus::InProgress,
        order_qty: selection.total_quantity,
        org_name: truck.haulier_name.clone(),
        driver_name,
        driver_cin,
    })
}

/// The truck must leave exactly full.
///
/// # Errors
///
/// Returns [`PlanningError::UnderCapacity`] or [`PlanningError::OverCapacity`].
pub fn check_capacity(total: f64, capacity: f64) -> Result<(), PlanningError> {
    if total < capacity {
        return Err(PlanningError::UnderCapacity { total, capacity });
    }
    if total > capacity {
        return Err(PlanningError::OverCapacity { total, capacity });
    }
    Ok(())
}

fn pick(chosen: Option<String>, fallback: Option<&str>) -> Option<String> {
    chosen
        .filter(|s| !s.trim().is_empty())
        .or_else(|| fallback.map(str::to_string))
        .filter(|s| !s.trim().is_empty())
}

fn line_label(order: &Order) -> String {
    match &order.item {
        Some(item) => format!("{}/{item}", order.sales_order),
        None => order.sales_order.clone(),
    }
}

/// Check the fields a stored trip must carry.
///
/// # Errors
///
/// Returns the first missing field.
pub fn validate_trip(trip: &Trip) -> Result<(), PlanningError> {
    let required = [
        ("Trip Num", Some(trip.trip_num.as_str())),
        ("Vehicle Id", trip.vehicle_id.as_deref()),
        ("Driver Name", trip.driver_name.as_deref()),
        ("Tour Start Date", trip.tour_start_date.as_deref()),
    ];
    for (field, value) in required {
        if value.is_none_or(|v| v.trim().is_empty()) {
            return Err(PlanningError::MissingField(field));
        }
    }
    if trip.orders.is_empty() {
        return Err(PlanningError::NoOrders);
    }
    Ok(())
}

/// Create a trip after checking the plan against the dispatch rules.
///
/// # Errors
///
/// Returns a planning error before any request, or the backend error.
#[instrument(skip(api, selection, truck, details), fields(vehicle = %truck.vehicle, lines = selection.lines.len()))]
pub async fn create_trip(
    api: &ApiClient,
    selection: &Selection,
    truck: &Truck,
    details: TripDetails,
) -> Result<Trip, AppError> {
    let request = build_trip_request(selection, truck, details)?;
    let trip = api.create_trip(&request).await?;
    debug!(trip_num = %trip.trip_num, quantity = request.order_qty, "Trip created");
    Ok(trip)
}

/// Add an order line to an existing trip.
///
/// # Errors
///
/// Returns a planning error when the line belongs to another trip, breaks
/// the regime or overloads the truck; otherwise the backend error.
#[instrument(skip(api), fields(trip_id = %trip_id, order_id = %order_id))]
pub async fn assign_order(api: &ApiClient, trip_id: TripId, order_id: OrderId) -> Result<Trip, AppError> {
    let mut trip = api.get_trip(trip_id).await?;
    if trip.orders.iter().any(|o| o.id == Some(order_id)) {
        return Ok(trip);
    }

    let order = api.get_order(order_id).await?;
    if let Some(other) = order.trip_num.as_deref().filter(|t| !t.is_empty() && *t != trip.trip_num) {
        return Err(PlanningError::AlreadyAssigned {
            order: order_id,
            trip: other.to_string(),
        }
        .into());
    }
    if let (Some(current), Some(incoming)) = (trip.regime(), order.regime)
        && current != incoming
    {
        return Err(PlanningError::MixedRegimes.into());
    }
    if let Some(truck) = &trip.truck {
        let total = trip.total_quantity() + order.quantity;
        if total > truck.capacity {
            return Err(PlanningError::OverCapacity {
                total,
                capacity: truck.capacity,
            }
            .into());
        }
    }

    trip.orders.push(order);
    validate_trip(&trip)?;
    Ok(api.update_trip(trip_id, &trip).await?)
}

/// Take an order line off a trip.
///
/// # Errors
///
/// Returns [`PlanningError::NoOrders`] when it is the trip's last line, or
/// the backend error.
#[instrument(skip(api), fields(trip_id = %trip_id, order_id = %order_id))]
pub async fn remove_order(api: &ApiClient, trip_id: TripId, order_id: OrderId) -> Result<Trip, AppError> {
    let mut trip = api.get_trip(trip_id).await?;
    trip.orders.retain(|o| o.id != Some(order_id));
    validate_trip(&trip)?;
    Ok(api.update_trip(trip_id, &trip).await?)
}

/// Set a trip's status (fetch, change, store).
///
/// # Errors
///
/// Returns error if the trip cannot be fetched or stored.
#[instrument(skip(api), fields(trip_id = %trip_id, status = %status))]
pub async fn update_trip_status(api: &ApiClient, trip_id: TripId, status: TripStatus) -> Result<Trip, AppError> {
    let mut trip = api.get_trip(trip_id).await?;
    trip.status = Some(status.as_str().to_string());
    Ok(api.update_trip(trip_id, &trip).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i64, sales_order: &str, qty: f64, regime: OrderRegime) -> Order {
        Order {
            id: Some(OrderId::new(id)),
            sales_order: sales_order.to_string(),
            item: Some("10".to_string()),
            quantity: qty,
            regime: Some(regime),
            ..Order::default()
        }
    }

    fn truck(vehicle: &str, mpgi: &str, capacity: f64) -> Truck {
        Truck {
            vehicle: vehicle.to_string(),
            mpgi: mpgi.to_string(),
            capacity,
            haulier_name: Some("Transports Atlas".to_string()),
            driver_name: Some("Karim Alaoui".to_string()),
            driver_cin: Some("BK123456".to_string()),
            ..Truck::default()
        }
    }

    fn details() -> TripDetails {
        TripDetails {
            tour_start_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..TripDetails::default()
        }
    }

    fn selection(lines: Vec<Order>) -> Selection {
        let groups = group_by_sales_order(lines);
        let refs: Vec<&OrderGroup> = groups.iter().collect();
        Selection::new(&refs).unwrap()
    }

    #[test]
    fn test_candidates_skip_assigned_lines() {
        let mut assigned = line(1, "S1", 100.0, OrderRegime::Vrac);
        assigned.trip_num = Some("55".to_string());
        let groups = candidate_orders(vec![assigned, line(2, "S2", 100.0, OrderRegime::Vrac)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "S2");
    }

    #[test]
    fn test_mixed_regimes_rejected() {
        let groups = group_by_sales_order(vec![
            line(1, "S1", 100.0, OrderRegime::Vrac),
            line(2, "S2", 100.0, OrderRegime::Pack),
        ]);
        let refs: Vec<&OrderGroup> = groups.iter().collect();
        assert_eq!(Selection::new(&refs).unwrap_err(), PlanningError::MixedRegimes);
    }

    #[test]
    fn test_available_trucks_match_regime_and_capacity() {
        let trucks = [
            truck("BIG", "Gasoil", 30000.0),
            truck("SMALL", "Gasoil", 10000.0),
            truck("PACKER", "Packed goods", 40000.0),
            truck("MID", "Essence", 20000.0),
        ];
        let sel = selection(vec![line(1, "S1", 20000.0, OrderRegime::Vrac)]);
        let names: Vec<&str> = available_trucks(&trucks, &sel)
            .iter()
            .map(|t| t.vehicle.as_str())
            .collect();
        assert_eq!(names, vec!["MID", "BIG"]);

        let packed = selection(vec![line(2, "S2", 500.0, OrderRegime::Pack)]);
        let names: Vec<&str> = available_trucks(&trucks, &packed)
            .iter()
            .map(|t| t.vehicle.as_str())
            .collect();
        assert_eq!(names, vec!["PACKER"]);
    }

    #[test]
    fn test_underfilled_truck_is_blocked() {
        let sel = selection(vec![
            line(1, "S1", 15000.0, OrderRegime::Vrac),
            line(2, "S2", 10000.0, OrderRegime::Vrac),
        ]);
        let t = truck("12345A6", "Gasoil", 30000.0);
        let err = build_trip_request(&sel, &t, details()).unwrap_err();
        assert_eq!(
            err,
            PlanningError::UnderCapacity {
                total: 25000.0,
                capacity: 30000.0
            }
        );
        assert!((utilization(25000.0, 30000.0) - 83.333).abs() < 0.001);
        assert!(err.to_string().ends_with("(25000 of 30000)"));
    }

    #[test]
    fn test_full_truck_builds_request_with_driver_defaults() {
        let sel = selection(vec![
            line(1, "S1", 20000.0, OrderRegime::Vrac),
            line(2, "S2", 10000.0, OrderRegime::Vrac),
        ]);
        let t = truck("12345A6", "Gasoil", 30000.0);
        let request = build_trip_request(&sel, &t, details()).unwrap();
        assert_eq!(request.vehicle_id, "12345A6");
        assert_eq!(request.order_ids, vec![OrderId::new(1), OrderId::new(2)]);
        assert_eq!(request.status, TripStatus::InProgress);
        assert_eq!(request.driver_name, "Karim Alaoui");
        assert_eq!(request.driver_cin, "BK123456");
        assert_eq!(request.org_name.as_deref(), Some("Transports Atlas"));

        let overridden = build_trip_request(
            &sel,
            &t,
            TripDetails {
                driver_name: Some("Youssef".to_string()),
                ..details()
            },
        )
        .unwrap();
        assert_eq!(overridden.driver_name, "Youssef");
    }

    #[test]
    fn test_overloaded_truck_is_blocked() {
        let sel = selection(vec![line(1, "S1", 31000.0, OrderRegime::Vrac)]);
        let t = truck("12345A6", "Gasoil", 30000.0);
        assert!(matches!(
            build_trip_request(&sel, &t, details()),
            Err(PlanningError::OverCapacity { .. })
        ));
    }

    #[test]
    fn test_validate_trip_required_fields() {
        let mut trip = Trip {
            trip_num: "55".to_string(),
            vehicle_id: Some("12345A6".to_string()),
            driver_name: Some("Karim".to_string()),
            tour_start_date: Some("2024-05-02".to_string()),
            ..Trip::default()
        };
        assert_eq!(validate_trip(&trip), Err(PlanningError::NoOrders));
        trip.orders.push(line(1, "S1", 1.0, OrderRegime::Vrac));
        assert!(validate_trip(&trip).is_ok());
        trip.driver_name = None;
        assert_eq!(
            validate_trip(&trip),
            Err(PlanningError::MissingField("Driver Name"))
        );
    }
}
