//! Backend request and response types.
//!
//! Field names follow the backend's JSON keys, which are the spreadsheet
//! column headers of the ERP export (`"Sales Order"`, `"Order Qty"`, ...).
//! Records keep unknown keys in an `extra` map so that fetch, modify and
//! `PUT` round-trips never drop columns this console does not model.

use std::collections::BTreeMap;

use fuelops_core::{
    ClientId, ImportId, ImportKind, OrderId, OrderRegime, OrderStatus, PlantId, PriceId, ProductId,
    TankId, TripId, TripStatus, TruckId, UserId, VatRate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// A console user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub role: Option<String>,
}

// =============================================================================
// Reference data
// =============================================================================

/// A product master record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(rename = "Material", default, deserialize_with = "lenient::string")]
    pub material: String,
    #[serde(
        rename = "Material description",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        rename = "Base Unit of Measure",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_unit: Option<String>,
    /// VAT rate as a fraction (`0.1` for 10 %).
    #[serde(
        rename = "Tax",
        default,
        deserialize_with = "lenient::opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<Decimal>,
    /// Density at 15 °C, required for bulk loading.
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// Loading temperature, required for bulk loading.
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Product {
    /// VAT rate, zero when the product has none.
    #[must_use]
    pub fn vat_rate(&self) -> VatRate {
        self.tax.map_or(VatRate::ZERO, VatRate::new)
    }
}

/// A client master record, carrying both the sold-to and ship-to roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ClientId>,
    #[serde(rename = "Customer Sold to", default, deserialize_with = "lenient::string")]
    pub sold_to: String,
    #[serde(rename = "Customer Sold to name", default, deserialize_with = "lenient::opt_string")]
    pub sold_to_name: Option<String>,
    #[serde(rename = "Customer Ship to", default, deserialize_with = "lenient::string")]
    pub ship_to: String,
    #[serde(rename = "Customer ship to name", default, deserialize_with = "lenient::opt_string")]
    pub ship_to_name: Option<String>,
    #[serde(rename = "Customer ship to Address", default, deserialize_with = "lenient::opt_string")]
    pub ship_to_address: Option<String>,
    #[serde(rename = "Customer ship to city", default, deserialize_with = "lenient::opt_string")]
    pub ship_to_city: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "lenient::opt_string")]
    pub country: Option<String>,
    #[serde(rename = "ID Fiscal", default, deserialize_with = "lenient::opt_string")]
    pub fiscal_id: Option<String>,
    #[serde(rename = "ICE", default, deserialize_with = "lenient::opt_string")]
    pub ice: Option<String>,
    #[serde(rename = "Statut de droit", default, deserialize_with = "lenient::opt_string")]
    pub duty_status: Option<String>,
    #[serde(rename = "Statut de droit name", default, deserialize_with = "lenient::opt_string")]
    pub duty_status_name: Option<String>,
    #[serde(rename = "Paiement terms", default, deserialize_with = "lenient::opt_string")]
    pub payment_terms: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A depot (plant) master record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlantId>,
    #[serde(rename = "Plant Code", default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(rename = "Description", default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A delivery truck master record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TruckId>,
    #[serde(rename = "Vehicle", default, deserialize_with = "lenient::string")]
    pub vehicle: String,
    /// Product group; mentions "packed" for packaged-goods trucks.
    #[serde(rename = "MPGI", default, deserialize_with = "lenient::string")]
    pub mpgi: String,
    #[serde(rename = "Vehicule Capacity", default, deserialize_with = "lenient::f64_or_zero")]
    pub capacity: f64,
    #[serde(rename = "Vehicle-Type", default, deserialize_with = "lenient::opt_string")]
    pub vehicle_type: Option<String>,
    #[serde(rename = "Class-Group", default, deserialize_with = "lenient::opt_string")]
    pub class_group: Option<String>,
    #[serde(rename = "Haulier name", default, deserialize_with = "lenient::opt_string")]
    pub haulier_name: Option<String>,
    #[serde(rename = "Driver name", default, deserialize_with = "lenient::opt_string")]
    pub driver_name: Option<String>,
    #[serde(rename = "Driver CIN", default, deserialize_with = "lenient::opt_string")]
    pub driver_cin: Option<String>,
    #[serde(rename = "Trailer Number", default, deserialize_with = "lenient::opt_string")]
    pub trailer_number: Option<String>,
    /// Number of seal slots to fill at bulk loading.
    #[serde(rename = "Seals", default, deserialize_with = "lenient::u32_or_zero")]
    pub seals: u32,
    #[serde(rename = "Comp1", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp1: f64,
    #[serde(rename = "Comp2", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp2: f64,
    #[serde(rename = "Comp3", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp3: f64,
    #[serde(rename = "Comp4", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp4: f64,
    #[serde(rename = "Comp5", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp5: f64,
    #[serde(rename = "Comp6", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp6: f64,
    #[serde(rename = "Comp7", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp7: f64,
    #[serde(rename = "Comp8", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp8: f64,
    #[serde(rename = "Comp9", default, deserialize_with = "lenient::f64_or_zero")]
    pub comp9: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Truck {
    /// Regime this truck can carry.
    #[must_use]
    pub fn regime(&self) -> OrderRegime {
        OrderRegime::from_truck_group(&self.mpgi)
    }

    /// Compartment capacities in slot order (`Comp1` first).
    #[must_use]
    pub const fn compartment_capacities(&self) -> [f64; 9] {
        [
            self.comp1, self.comp2, self.comp3, self.comp4, self.comp5, self.comp6, self.comp7,
            self.comp8, self.comp9,
        ]
    }
}

/// A price list entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PriceId>,
    #[serde(rename = "Material", default, deserialize_with = "lenient::string")]
    pub material: String,
    #[serde(rename = "Customer", default, deserialize_with = "lenient::opt_string")]
    pub customer: Option<String>,
    #[serde(rename = "Price", default, deserialize_with = "lenient::opt_decimal")]
    pub price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A depot storage tank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TankId>,
    #[serde(rename = "Plant", default, deserialize_with = "lenient::opt_string")]
    pub plant: Option<String>,
    #[serde(rename = "Material", default, deserialize_with = "lenient::opt_string")]
    pub material: Option<String>,
    #[serde(rename = "Capacity", default, deserialize_with = "lenient::opt_f64")]
    pub capacity: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// =============================================================================
// Orders
// =============================================================================

/// One sales order line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    #[serde(rename = "Sales Order", default, deserialize_with = "lenient::string")]
    pub sales_order: String,
    #[serde(rename = "Item", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(rename = "Order Type", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(rename = "Customer", default, deserialize_with = "lenient::string")]
    pub customer: String,
    #[serde(rename = "Customer Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(rename = "Plant", default, deserialize_with = "lenient::string")]
    pub plant: String,
    #[serde(rename = "Plant Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
    #[serde(rename = "Ship To Party", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub ship_to_party: Option<String>,
    #[serde(rename = "Ship To Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub ship_to_name: Option<String>,
    #[serde(rename = "Valution Type", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub valuation_type: Option<String>,
    #[serde(rename = "City(Ship To)", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub ship_to_city: Option<String>,
    #[serde(rename = "Material Code", default, deserialize_with = "lenient::string")]
    pub material_code: String,
    #[serde(rename = "Material Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    #[serde(rename = "Order Qty", default, deserialize_with = "lenient::f64_or_zero")]
    pub quantity: f64,
    #[serde(rename = "Sls.UOM", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "Requested delivery date", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub requested_delivery_date: Option<String>,
    #[serde(rename = "Pat.Doc", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub pat_doc: Option<String>,
    #[serde(rename = "Trip Num", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub trip_num: Option<String>,
    #[serde(rename = "Tour Start Date", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub tour_start_date: Option<String>,
    #[serde(rename = "Org Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(rename = "Driver Name", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(rename = "Vehicle Id", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "order_type", default, deserialize_with = "lenient::opt_parsed", skip_serializing_if = "Option::is_none")]
    pub regime: Option<OrderRegime>,
    /// Net amount of the line as priced by the backend.
    #[serde(rename = "Total Price", default, deserialize_with = "lenient::opt_decimal", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(rename = "Product", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(rename = "CustomerInfo", default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<Client>,
    #[serde(rename = "ShipToInfo", default, skip_serializing_if = "Option::is_none")]
    pub ship_to_info: Option<Client>,
    #[serde(rename = "PlantInfo", default, skip_serializing_if = "Option::is_none")]
    pub plant_info: Option<Plant>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Order {
    /// Lifecycle status; records without a recognised status count as `Created`.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Whether this line is already assigned to a trip.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.trip_num.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Sold-to code used to group documents: the embedded client record when
    /// present, the order's own customer column otherwise.
    #[must_use]
    pub fn sold_to(&self) -> &str {
        self.customer_info
            .as_ref()
            .map(|c| c.sold_to.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.customer)
    }

    /// Unit of measure, preferring the product's base unit.
    #[must_use]
    pub fn unit_of_measure(&self) -> Option<&str> {
        self.product
            .as_ref()
            .and_then(|p| p.base_unit.as_deref())
            .or(self.unit.as_deref())
    }
}

/// Query filters for `GET /orders`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_num: Option<String>,
    /// Single delivery day, used by the daily report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<chrono::NaiveDate>,
}

impl OrderFilter {
    #[must_use]
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// A per-row error reported by the backend.
///
/// The backend reports either bare strings or `{row, error, data}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRowError")]
pub struct BackendRowError {
    pub row: Option<usize>,
    pub error: String,
    pub data: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRowError {
    Text(String),
    Detailed {
        #[serde(default)]
        row: Option<usize>,
        #[serde(alias = "message")]
        error: String,
        #[serde(default)]
        data: Option<Value>,
    },
}

impl From<RawRowError> for BackendRowError {
    fn from(raw: RawRowError) -> Self {
        match raw {
            RawRowError::Text(error) => Self {
                row: None,
                error,
                data: None,
            },
            RawRowError::Detailed { row, error, data } => Self { row, error, data },
        }
    }
}

/// Response of `POST /orders/import`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderImportResponse {
    #[serde(default)]
    pub orders_created: usize,
    #[serde(default)]
    pub errors: Vec<BackendRowError>,
}

/// Response of `POST /orders/create-multiple`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMultipleResponse {
    #[serde(default)]
    pub created: Vec<Order>,
    #[serde(default)]
    pub errors: Vec<BackendRowError>,
}

/// Response of `GET /orders/latest-sales-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestSalesOrder {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub latest_sales_order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIds<'a> {
    pub order_ids: &'a [OrderId],
}

/// Body of `PUT /orders/bulk-update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdate<'a> {
    pub order_ids: &'a [OrderId],
    pub updates: &'a BTreeMap<String, Value>,
}

// =============================================================================
// Trips
// =============================================================================

/// A delivery trip with its assigned order lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TripId>,
    #[serde(rename = "Trip Num", default, deserialize_with = "lenient::string")]
    pub trip_num: String,
    #[serde(rename = "Vehicle Id", default, deserialize_with = "lenient::opt_string")]
    pub vehicle_id: Option<String>,
    #[serde(rename = "Driver Name", default, deserialize_with = "lenient::opt_string")]
    pub driver_name: Option<String>,
    #[serde(rename = "Driver CIN", default, deserialize_with = "lenient::opt_string")]
    pub driver_cin: Option<String>,
    #[serde(rename = "Tour Start Date", default, deserialize_with = "lenient::opt_string")]
    pub tour_start_date: Option<String>,
    #[serde(rename = "Org Name", default, deserialize_with = "lenient::opt_string")]
    pub org_name: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    /// Invoice number assigned by the backend.
    #[serde(rename = "numfacture", default, deserialize_with = "lenient::opt_string")]
    pub invoice_number: Option<String>,
    /// Delivery number assigned by the backend.
    #[serde(rename = "numlivraison", default, deserialize_with = "lenient::opt_string")]
    pub delivery_number: Option<String>,
    #[serde(rename = "createdBy", default, deserialize_with = "lenient::opt_string")]
    pub created_by: Option<String>,
    #[serde(rename = "Orders", alias = "totalorders", default)]
    pub orders: Vec<Order>,
    #[serde(rename = "Truck", default, skip_serializing_if = "Option::is_none")]
    pub truck: Option<Truck>,
    #[serde(rename = "sealnumbers", default)]
    pub seal_numbers: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Trip {
    /// Lifecycle status; records without a recognised status count as `Planned`.
    #[must_use]
    pub fn status(&self) -> TripStatus {
        self.status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Sum of assigned quantities.
    #[must_use]
    pub fn total_quantity(&self) -> f64 {
        self.orders.iter().map(|o| o.quantity).sum()
    }

    /// Regime of the trip, taken from its first order line.
    #[must_use]
    pub fn regime(&self) -> Option<OrderRegime> {
        self.orders.first().and_then(|o| o.regime)
    }
}

/// One page of `GET /trips`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPage {
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub total_count: u64,
}

/// Body of `POST /trips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub vehicle_id: String,
    pub tour_start_date: chrono::NaiveDate,
    pub order_ids: Vec<OrderId>,
    pub status: TripStatus,
    pub order_qty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    pub driver_name: String,
    #[serde(rename = "driverCIN")]
    pub driver_cin: String,
}

/// Body of `PUT /trips/:id/loading`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripLoadingUpdate {
    #[serde(rename = "Status")]
    pub status: TripStatus,
    #[serde(rename = "sealnumbers")]
    pub seal_numbers: Vec<String>,
}

/// Body of `POST /trips/:id/confirm-loading`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmLoadingRequest {
    /// Seal number per compartment label (`Comp1` ...).
    pub seal_numbers: BTreeMap<String, String>,
    pub status: String,
}

/// Response of `POST /trips/:id/confirm-loading`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmLoadingResponse {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_trip_status: Option<String>,
}

// =============================================================================
// Imports
// =============================================================================

/// Per-record success reported by the master-data import endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSuccess {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Response of `POST /import/:type`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub records_imported: usize,
    #[serde(default)]
    pub errors: Vec<BackendRowError>,
    #[serde(default)]
    pub successes: Vec<ImportSuccess>,
}

/// One entry of the import history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistoryEntry {
    #[serde(default)]
    pub id: Option<ImportId>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_parsed")]
    pub kind: Option<ImportKind>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub records_imported: usize,
    #[serde(default)]
    pub errors: Vec<BackendRowError>,
}

/// A page of import history, normalised from either wire shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawHistory")]
pub struct ImportHistoryPage {
    pub items: Vec<ImportHistoryEntry>,
    /// Total entries, when the backend reports it.
    pub total_items: Option<usize>,
    /// Total pages, when the backend reports it.
    pub total_pages: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHistory {
    Bare(Vec<ImportHistoryEntry>),
    #[serde(rename_all = "camelCase")]
    Envelope {
        items: Vec<ImportHistoryEntry>,
        #[serde(default)]
        total_items: Option<usize>,
        #[serde(default)]
        total_pages: Option<usize>,
    },
}

impl From<RawHistory> for ImportHistoryPage {
    fn from(raw: RawHistory) -> Self {
        match raw {
            RawHistory::Bare(items) => Self {
                items,
                total_items: None,
                total_pages: None,
            },
            RawHistory::Envelope {
                items,
                total_items,
                total_pages,
            } => Self {
                items,
                total_items,
                total_pages,
            },
        }
    }
}

impl ImportHistoryPage {
    /// Total entries, falling back to the page length.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items.unwrap_or(self.items.len())
    }

    /// Total pages for `per_page` entries per page, falling back to a count
    /// derived from the entries.
    #[must_use]
    pub fn total_pages(&self, per_page: usize) -> usize {
        self.total_pages
            .unwrap_or_else(|| self.total_items().div_ceil(per_page.max(1)))
            .max(1)
    }
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
