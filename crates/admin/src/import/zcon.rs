//! Depot-to-depot transfer rows.
//!
//! A ZCON order moves product between two depots. Its customer is the
//! receiving depot, written as `CP` + plant code; the ship-to party is the
//! same depot and the destination city is fixed.

use fuelops_core::PlantCode;

use super::validate::is_zcon;
use super::{Dataset, Record};
use crate::lookup::LookupCache;

/// Destination city of every internal transfer.
pub const TRANSFER_CITY: &str = "Casablanca";

/// Rewrite one transfer row. Rows of other order types are left alone.
pub fn apply_to_record(record: &mut Record, lookup: &LookupCache) {
    if !is_zcon(record) {
        return;
    }
    let Ok(plant) = PlantCode::from_transfer_customer(record.get("Customer")) else {
        return;
    };

    let customer = plant.transfer_customer();
    record.set("Customer", customer.clone());
    record.set("Ship To Party", customer);
    record.set("City(Ship To)", TRANSFER_CITY);

    if let Some(description) = lookup.plant(plant.as_str()).and_then(|p| p.description.clone()) {
        record.set("Customer Name", description.clone());
        record.set("Ship To Name", description);
    }
}

/// Rewrite every transfer row of an order import.
pub fn apply(dataset: &mut Dataset, lookup: &LookupCache) {
    if !dataset.records.iter().any(is_zcon) {
        return;
    }
    for header in ["Ship To Party", "City(Ship To)", "Customer Name", "Ship To Name"] {
        dataset.ensure_column(header);
    }
    for record in &mut dataset.records {
        apply_to_record(record, lookup);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{Plant, ReferenceData};

    fn lookup() -> LookupCache {
        LookupCache::new(ReferenceData {
            plants: vec![Plant {
                code: "1020".to_string(),
                description: Some("Depot Mohammedia".to_string()),
                ..Plant::default()
            }],
            ..ReferenceData::default()
        })
    }

    fn zcon(customer: &str) -> Record {
        let mut record = Record {
            row: 1,
            ..Record::default()
        };
        record.set("Order Type", "ZCON");
        record.set("Customer", customer);
        record.set("Ship To Party", "500777");
        record.set("City(Ship To)", "Rabat");
        record
    }

    #[test]
    fn test_transfer_fields_regardless_of_prefix() {
        for customer in ["CP1020", "1020", " CP1020 "] {
            let mut record = zcon(customer);
            apply_to_record(&mut record, &lookup());
            assert_eq!(record.get("Customer"), "CP1020");
            assert_eq!(record.get("Ship To Party"), "CP1020");
            assert_eq!(record.get("City(Ship To)"), "Casablanca");
            assert_eq!(record.get("Customer Name"), "Depot Mohammedia");
            assert_eq!(record.get("Ship To Name"), "Depot Mohammedia");
        }
    }

    #[test]
    fn test_unknown_depot_keeps_names_untouched() {
        let mut record = zcon("CP4040");
        record.set("Customer Name", "As typed");
        apply_to_record(&mut record, &lookup());
        assert_eq!(record.get("Customer"), "CP4040");
        assert_eq!(record.get("City(Ship To)"), "Casablanca");
        assert_eq!(record.get("Customer Name"), "As typed");
    }

    #[test]
    fn test_other_order_types_untouched() {
        let mut record = zcon("100234");
        record.set("Order Type", "ZOR");
        let before = record.clone();
        apply_to_record(&mut record, &lookup());
        assert_eq!(record, before);
    }
}
