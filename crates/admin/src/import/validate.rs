//! Row-level validation of cleaned import data.
//!
//! Every problem is collected with the row it belongs to; one bad row never
//! stops the others from being checked.

use std::fmt;

use fuelops_core::{ImportKind, PlantCode};

use super::{Dataset, FieldKind, Record};
use crate::lookup::LookupCache;

/// Order type of depot-to-depot transfers.
pub const ZCON: &str = "ZCON";

/// A validation problem on one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row.
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Whether a row is an internal depot transfer.
#[must_use]
pub fn is_zcon(record: &Record) -> bool {
    record.get("Order Type").eq_ignore_ascii_case(ZCON)
}

/// Check required cells, numeric cells and references of every row.
#[must_use]
pub fn validate(dataset: &Dataset, lookup: &LookupCache) -> Vec<RowError> {
    let mut errors = Vec::new();
    for record in &dataset.records {
        check_fields(dataset, record, &mut errors);
        match dataset.kind() {
            ImportKind::Orders => check_order_references(record, lookup, &mut errors),
            ImportKind::Prices => check_price_references(record, lookup, &mut errors),
            ImportKind::Tanks => check_tank_references(record, lookup, &mut errors),
            ImportKind::Clients
            | ImportKind::Products
            | ImportKind::Trucks
            | ImportKind::Plants => {}
        }
    }
    errors
}

fn check_fields(dataset: &Dataset, record: &Record, errors: &mut Vec<RowError>) {
    for field in dataset.schema.fields {
        let value = record.get(field.header);
        if value.is_empty() {
            if field.required {
                errors.push(RowError::new(
                    record.row,
                    format!("{} is required", field.header),
                ));
            }
            continue;
        }
        if field.kind == FieldKind::Number && value.parse::<f64>().is_err() {
            errors.push(RowError::new(
                record.row,
                format!("{} \"{value}\" is not a number", field.header),
            ));
        }
    }
}

fn check_order_references(record: &Record, lookup: &LookupCache, errors: &mut Vec<RowError>) {
    let row = record.row;

    let material = record.get("Material Code");
    if !material.is_empty() && lookup.product(material).is_none() {
        errors.push(RowError::new(
            row,
            format!("Material Code \"{material}\" not found in products"),
        ));
    }

    if is_zcon(record) {
        let customer = record.get("Customer");
        let plant_code = PlantCode::from_transfer_customer(customer)
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        if lookup.plant(&plant_code).is_none() {
            errors.push(RowError::new(
                row,
                format!("Plant Code \"{plant_code}\" not found in plants for ZCON order"),
            ));
        }
    } else {
        let customer = record.get("Customer");
        if !customer.is_empty() && lookup.customer(customer).is_none() {
            errors.push(RowError::new(
                row,
                format!("Customer \"{customer}\" not found in clients"),
            ));
        }
        let ship_to = record.get("Ship To Party");
        if lookup.ship_to(ship_to).is_none() {
            errors.push(RowError::new(
                row,
                format!("Ship To Party \"{ship_to}\" not found in clients"),
            ));
        }
    }

    let plant = record.get("Plant");
    if !plant.is_empty() && lookup.plant(plant).is_none() {
        errors.push(RowError::new(row, format!("Plant \"{plant}\" not found in plants")));
    }

    let vehicle = record.get("Vehicle Id");
    if !vehicle.is_empty() && lookup.truck(vehicle).is_none() {
        errors.push(RowError::new(
            row,
            format!("Vehicle Id \"{vehicle}\" not found in trucks"),
        ));
    }
}

fn check_price_references(record: &Record, lookup: &LookupCache, errors: &mut Vec<RowError>) {
    let material = record.get("Material");
    if !material.is_empty() && lookup.product(material).is_none() {
        errors.push(RowError::new(
            record.row,
            format!("Material \"{material}\" not found in products"),
        ));
    }
    let customer = record.get("Customer");
    if !customer.is_empty() && lookup.customer(customer).is_none() {
        errors.push(RowError::new(
            record.row,
            format!("Customer \"{customer}\" not found in clients"),
        ));
    }
}

fn check_tank_references(record: &Record, lookup: &LookupCache, errors: &mut Vec<RowError>) {
    let plant = record.get("Plant");
    if !plant.is_empty() && lookup.plant(plant).is_none() {
        errors.push(RowError::new(
            record.row,
            format!("Plant \"{plant}\" not found in plants"),
        ));
    }
    let material = record.get("Material");
    if !material.is_empty() && lookup.product(material).is_none() {
        errors.push(RowError::new(
            record.row,
            format!("Material \"{material}\" not found in products"),
        ));
    }
}
