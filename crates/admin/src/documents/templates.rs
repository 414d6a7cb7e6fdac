//! Askama views of the printed documents.
//!
//! Every value is pre-formatted here so the templates only lay text out.

use askama::Template;
use chrono::{NaiveDate, NaiveDateTime};
use fuelops_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

use super::totals::{self, CustomerGroup, InvoiceTotals};
use super::words::AmountSpeller;
use crate::api::{Client, Order, Trip, Truck};
use crate::config::DocumentConfig;

const DEFAULT_COUNTRY: &str = "Morocco";

/// Company name and legal footer printed on every document.
#[derive(Debug, Clone, Default)]
pub struct Letterhead {
    pub company_name: String,
    pub footer_lines: Vec<String>,
}

impl Letterhead {
    /// Letterhead from configuration; footer lines are separated by `|`.
    #[must_use]
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self {
            company_name: config.company_name.clone(),
            footer_lines: config
                .company_footer
                .as_deref()
                .map(|f| {
                    f.split('|')
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// A postal block (billing or delivery party).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl Party {
    fn bill_to(order: &Order) -> Self {
        let info = order.customer_info.as_ref();
        Self {
            code: order.sold_to().to_string(),
            name: info
                .and_then(|c| c.sold_to_name.clone())
                .or_else(|| order.customer_name.clone())
                .unwrap_or_default(),
            ..Self::postal(info)
        }
    }

    fn ship_to(order: &Order) -> Self {
        let info = order.ship_to_info.as_ref();
        Self {
            code: info
                .map(|c| c.ship_to.clone())
                .filter(|s| !s.is_empty())
                .or_else(|| order.ship_to_party.clone())
                .unwrap_or_default(),
            name: info
                .and_then(|c| c.ship_to_name.clone())
                .or_else(|| order.ship_to_name.clone())
                .unwrap_or_default(),
            city: info
                .and_then(|c| c.ship_to_city.clone())
                .or_else(|| order.ship_to_city.clone())
                .unwrap_or_default(),
            ..Self::postal(info)
        }
    }

    fn postal(info: Option<&Client>) -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            address: info
                .and_then(|c| c.ship_to_address.clone())
                .unwrap_or_default(),
            city: info.and_then(|c| c.ship_to_city.clone()).unwrap_or_default(),
            country: info
                .and_then(|c| c.country.clone())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub code: String,
    pub description: String,
    pub regime: String,
    pub quantity: String,
    pub unit: String,
    pub duty_status: String,
    pub unit_price: String,
    pub net: String,
}

/// Invoice (`Facture`) for one customer of a trip.
#[derive(Debug, Template)]
#[template(path = "documents/invoice.html")]
pub struct InvoiceTemplate {
    pub letterhead: Letterhead,
    pub bill_to: Party,
    pub ship_to: Party,
    pub invoice_number: String,
    pub issued_on: String,
    pub currency: &'static str,
    pub plant_code: String,
    pub fiscal_id: String,
    pub ice: String,
    pub delivery_note_number: String,
    pub sales_order: String,
    pub delivery_date: String,
    pub reference: String,
    pub lines: Vec<InvoiceLine>,
    pub net: String,
    pub vat_label: String,
    pub vat: String,
    pub gross: String,
    pub amount_in_words: String,
    pub payment_terms: String,
    pub due_on: String,
}

impl InvoiceTemplate {
    #[must_use]
    pub fn build(
        trip: &Trip,
        group: &CustomerGroup<'_>,
        letterhead: &Letterhead,
        issued: NaiveDate,
        speller: &dyn AmountSpeller,
    ) -> Self {
        let first = group.first().cloned().unwrap_or_default();
        let info = first.customer_info.as_ref();
        let totals = InvoiceTotals::compute(&group.lines);
        let rate = totals.vat_rate;

        Self {
            letterhead: letterhead.clone(),
            bill_to: Party::bill_to(&first),
            ship_to: Party::ship_to(&first),
            invoice_number: text(trip.invoice_number.as_deref()),
            issued_on: issued.format("%d/%m/%Y").to_string(),
            currency: CurrencyCode::MAD.code(),
            plant_code: plant_code(&first),
            fiscal_id: text(info.and_then(|c| c.fiscal_id.as_deref())),
            ice: text(info.and_then(|c| c.ice.as_deref())),
            delivery_note_number: text(first.pat_doc.as_deref()),
            sales_order: first.sales_order.clone(),
            delivery_date: display_date(trip.tour_start_date.as_deref()),
            reference: extra_text(&first, "Votre référence"),
            lines: group
                .lines
                .iter()
                .map(|o| InvoiceLine {
                    code: product_code(o),
                    description: product_description(o),
                    regime: text(o.valuation_type.as_deref()),
                    quantity: display_quantity(o.quantity),
                    unit: text(o.unit_of_measure()),
                    duty_status: text(
                        o.customer_info
                            .as_ref()
                            .and_then(|c| c.duty_status.as_deref()),
                    ),
                    unit_price: totals::unit_price(o).map(money).unwrap_or_default(),
                    net: money(o.total_price.unwrap_or_default()),
                })
                .collect(),
            net: money(totals.net),
            vat_label: format!("{rate} AR VAT On Fuels"),
            vat: money(totals.vat),
            gross: money(totals.gross),
            amount_in_words: speller.spell(totals.gross).to_uppercase(),
            payment_terms: text(info.and_then(|c| c.payment_terms.as_deref())),
            due_on: totals::due_date(issued).format("%d/%m/%Y").to_string(),
        }
    }
}

// =============================================================================
// Delivery note
// =============================================================================

#[derive(Debug, Clone)]
pub struct DeliveryLine {
    pub code: String,
    pub description: String,
    pub regime: String,
    pub density: String,
    pub quantity: String,
}

/// Delivery note (`Bon de livraison`) for one customer of a trip.
#[derive(Debug, Template)]
#[template(path = "documents/delivery_note.html")]
pub struct DeliveryNoteTemplate {
    pub letterhead: Letterhead,
    pub bill_to: Party,
    pub ship_to: Party,
    pub delivery_number: String,
    pub delivery_date: String,
    pub plant_code: String,
    pub plant_name: String,
    pub pat_doc: String,
    pub created_by: String,
    pub printed_at: String,
    pub trip_num: String,
    pub fiscal_id: String,
    pub ice: String,
    pub sales_order: String,
    pub reference: String,
    pub seals: String,
    pub lines: Vec<DeliveryLine>,
    pub total_quantity: String,
    pub vehicle: String,
    pub trailer: String,
    pub haulier: String,
    pub driver_cin: String,
    pub driver_name: String,
}

impl DeliveryNoteTemplate {
    #[must_use]
    pub fn build(
        trip: &Trip,
        group: &CustomerGroup<'_>,
        letterhead: &Letterhead,
        printed: NaiveDateTime,
    ) -> Self {
        let first = group.first().cloned().unwrap_or_default();
        let info = first.customer_info.as_ref();
        let truck = trip.truck.as_ref();
        let unit = text(first.unit_of_measure());

        Self {
            letterhead: letterhead.clone(),
            bill_to: Party::bill_to(&first),
            ship_to: Party::ship_to(&first),
            delivery_number: text(trip.delivery_number.as_deref()),
            delivery_date: display_date(trip.tour_start_date.as_deref()),
            plant_code: plant_code(&first),
            plant_name: plant_name(&first),
            pat_doc: text(first.pat_doc.as_deref()),
            created_by: text(trip.created_by.as_deref()),
            printed_at: printed.format("%H:%M:%S").to_string(),
            trip_num: trip.trip_num.clone(),
            fiscal_id: text(info.and_then(|c| c.fiscal_id.as_deref())),
            ice: text(info.and_then(|c| c.ice.as_deref())),
            sales_order: first.sales_order.clone(),
            reference: extra_text(&first, "Reference"),
            seals: trip.seal_numbers.join(", "),
            lines: group
                .lines
                .iter()
                .map(|o| DeliveryLine {
                    code: product_code(o),
                    description: product_description(o),
                    regime: text(o.valuation_type.as_deref()),
                    density: o
                        .product
                        .as_ref()
                        .and_then(|p| p.density)
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    quantity: format!(
                        "{} {}",
                        display_quantity(o.quantity),
                        text(o.unit_of_measure())
                    )
                    .trim_end()
                    .to_string(),
                })
                .collect(),
            total_quantity: format!("{} {unit}", display_quantity(group.total_quantity()))
                .trim_end()
                .to_string(),
            vehicle: truck_text(truck, |t| Some(t.vehicle.as_str())),
            trailer: truck_text(truck, |t| t.trailer_number.as_deref()),
            haulier: truck_text(truck, |t| t.haulier_name.as_deref()),
            driver_cin: text(trip.driver_cin.as_deref()),
            driver_name: text(trip.driver_name.as_deref()),
        }
    }
}

// =============================================================================
// Loading slip
// =============================================================================

#[derive(Debug, Clone)]
pub struct SlipDelivery {
    pub sales_order: String,
    pub ship_to: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct SlipLine {
    pub code: String,
    pub description: String,
    pub regime: String,
    pub quantity: String,
    pub unit: String,
    pub duty_status: String,
}

#[derive(Debug, Clone)]
pub struct SlipProduct {
    pub code: String,
    pub description: String,
    pub regime: String,
    pub quantity: String,
    pub unit: String,
}

/// Loading slip (`Bon de chargement`) for a whole trip.
#[derive(Debug, Template)]
#[template(path = "documents/loading_slip.html")]
pub struct LoadingSlipTemplate {
    pub letterhead: Letterhead,
    pub vehicle: String,
    pub trailer: String,
    pub trip_num: String,
    pub haulier: String,
    pub capacity: String,
    pub driver_cin: String,
    pub driver_name: String,
    pub printed_on: String,
    pub printed_at: String,
    pub created_by: String,
    pub pat_doc: String,
    pub plant_code: String,
    pub plant_name: String,
    pub deliveries: Vec<SlipDelivery>,
    pub lines: Vec<SlipLine>,
    pub products: Vec<SlipProduct>,
    pub total_quantity: String,
}

impl LoadingSlipTemplate {
    #[must_use]
    pub fn build(trip: &Trip, letterhead: &Letterhead, printed: NaiveDateTime) -> Self {
        let first = trip.orders.first().cloned().unwrap_or_default();
        let truck = trip.truck.as_ref();

        Self {
            letterhead: letterhead.clone(),
            vehicle: truck_text(truck, |t| Some(t.vehicle.as_str())),
            trailer: truck_text(truck, |t| t.trailer_number.as_deref()),
            trip_num: trip.trip_num.clone(),
            haulier: truck_text(truck, |t| t.haulier_name.as_deref()),
            capacity: truck.map_or_else(|| "N/A".to_string(), |t| display_quantity(t.capacity)),
            driver_cin: text(trip.driver_cin.as_deref()),
            driver_name: text(trip.driver_name.as_deref()),
            printed_on: printed.format("%d/%m/%Y").to_string(),
            printed_at: printed.format("%H:%M:%S").to_string(),
            created_by: text(trip.created_by.as_deref()),
            pat_doc: text(first.pat_doc.as_deref()),
            plant_code: plant_code(&first),
            plant_name: plant_name(&first),
            deliveries: trip
                .orders
                .iter()
                .map(|o| {
                    let ship_to = Party::ship_to(o);
                    SlipDelivery {
                        sales_order: o.sales_order.clone(),
                        ship_to: ship_to.code,
                        city: ship_to.city,
                    }
                })
                .collect(),
            lines: trip
                .orders
                .iter()
                .map(|o| SlipLine {
                    code: o.material_code.clone(),
                    description: product_description(o),
                    regime: text(o.valuation_type.as_deref()),
                    quantity: display_quantity(o.quantity),
                    unit: text(o.unit_of_measure()),
                    duty_status: text(
                        o.customer_info
                            .as_ref()
                            .and_then(|c| c.duty_status_name.as_deref()),
                    ),
                })
                .collect(),
            products: totals::product_totals(&trip.orders)
                .into_iter()
                .map(|p| SlipProduct {
                    code: p.material,
                    description: p.description.unwrap_or_default(),
                    regime: p.valuation_type.unwrap_or_default(),
                    quantity: format!("{:.2}", p.quantity),
                    unit: p.unit.unwrap_or_default(),
                })
                .collect(),
            total_quantity: display_quantity(trip.total_quantity()),
        }
    }
}

// =============================================================================
// Formatting helpers
// =============================================================================

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn truck_text(truck: Option<&Truck>, field: impl Fn(&Truck) -> Option<&str>) -> String {
    truck
        .and_then(field)
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

fn extra_text(order: &Order, key: &str) -> String {
    order
        .extra
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn plant_code(order: &Order) -> String {
    order
        .plant_info
        .as_ref()
        .map(|p| p.code.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| order.plant.clone())
}

fn plant_name(order: &Order) -> String {
    order
        .plant_info
        .as_ref()
        .and_then(|p| p.description.clone())
        .or_else(|| order.plant_name.clone())
        .unwrap_or_default()
}

fn product_code(order: &Order) -> String {
    order
        .product
        .as_ref()
        .map(|p| p.material.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| order.material_code.clone())
}

fn product_description(order: &Order) -> String {
    order
        .product
        .as_ref()
        .and_then(|p| p.description.clone())
        .or_else(|| order.material_name.clone())
        .unwrap_or_default()
}

fn money(amount: Decimal) -> String {
    Price::mad(amount).display_fr()
}

/// Whole quantities print without decimals.
fn display_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}

/// `2024-05-02` (optionally followed by a time) as `02/05/2024`; anything
/// else is printed as received.
fn display_date(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or_default();
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map_or_else(|| raw.to_string(), |d| d.format("%d/%m/%Y").to_string())
}
