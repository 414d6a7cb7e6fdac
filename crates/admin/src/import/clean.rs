//! Formatting cleanup of imported cells.
//!
//! Cleaning is idempotent: running it on cleaned data changes nothing.

use chrono::NaiveDate;
use fuelops_core::{strip_leading_zeros, strip_separators};

use super::{Dataset, FieldKind};

/// Day-first and ISO layouts seen in ERP exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Clean one cell according to its field kind.
#[must_use]
pub fn clean_value(kind: FieldKind, value: &str) -> String {
    let value = value.trim();
    match kind {
        FieldKind::Text => value.to_string(),
        FieldKind::Code => strip_leading_zeros(value),
        FieldKind::Vehicle => strip_separators(value),
        FieldKind::Number => {
            if value.contains(',') && !value.contains('.') {
                value.replace(',', ".")
            } else {
                value.to_string()
            }
        }
        FieldKind::Date => parse_date(value).map_or_else(|| value.to_string(), |d| d.to_string()),
    }
}

/// Parse a date cell in any accepted layout.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    // Spreadsheet cells may carry a time part.
    let date_part = value.split([' ', 'T']).next().unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Clean every schema column of every row in place.
pub fn clean(dataset: &mut Dataset) {
    let schema = dataset.schema;
    for record in &mut dataset.records {
        for (header, value) in &mut record.values {
            let kind = schema.field(header).map_or(FieldKind::Text, |f| f.kind);
            *value = clean_value(kind, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fuelops_core::ImportKind;

    use super::*;
    use crate::import::{ImportSchema, RawTable};

    fn orders(rows: &[&[&str]]) -> Dataset {
        let headers = [
            "Sales Order",
            "Customer",
            "Plant",
            "Material Code",
            "Order Qty",
            "Pat.Doc",
            "Trip Num",
            "Vehicle Id",
            "Requested delivery date",
        ];
        ImportSchema::for_kind(ImportKind::Orders)
            .map_table(RawTable {
                headers: headers.iter().map(ToString::to_string).collect(),
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(ToString::to_string).collect())
                    .collect(),
            })
            .unwrap()
    }

    #[test]
    fn test_clean_strips_codes_and_vehicle_separators() {
        let mut data = orders(&[&[
            " 4500012 ",
            "100234",
            "1020",
            "000000000000200123",
            "12000,5",
            "0080001234",
            "00017",
            "12345-A-6",
            "02/05/2024",
        ]]);
        clean(&mut data);
        let record = &data.records[0];
        assert_eq!(record.get("Sales Order"), "4500012");
        assert_eq!(record.get("Material Code"), "200123");
        assert_eq!(record.get("Pat.Doc"), "80001234");
        assert_eq!(record.get("Trip Num"), "17");
        assert_eq!(record.get("Vehicle Id"), "12345A6");
        assert_eq!(record.get("Order Qty"), "12000.5");
        assert_eq!(record.get("Requested delivery date"), "2024-05-02");
        assert_eq!(record.get("Plant"), "1020");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let mut once = orders(&[
            &["1", "C1", "1020", "000123", "1,5", "0042", "", "1 2-3", "2024-05-02 00:00:00"],
            &["2", "C2", "1030", "123", "7", "", "009", "", "not a date"],
        ]);
        clean(&mut once);
        let mut twice = once.clone();
        clean(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_columns_are_trimmed_only() {
        assert_eq!(clean_value(FieldKind::Text, " 007 "), "007");
        assert_eq!(clean_value(FieldKind::Code, " 007 "), "7");
    }
}
