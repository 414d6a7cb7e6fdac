//! Declarative column schemas for each import type.
//!
//! A schema lists the columns an import understands: the canonical header
//! the backend expects, accepted header aliases, how the cell is cleaned and
//! whether it must be filled in. Adding an import type is a matter of adding
//! a table here.
//!
//! Columns the schema does not know are carried through untouched.

use std::collections::BTreeMap;

use fuelops_core::ImportKind;

use super::{ImportError, RawTable};

/// How a cell is normalised and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, trimmed.
    Text,
    /// Business code; leading zeros are stripped.
    Code,
    /// Vehicle registration; separators are stripped.
    Vehicle,
    /// Decimal number; a decimal comma is accepted.
    Number,
    /// Calendar date, normalised to `YYYY-MM-DD` when recognised.
    Date,
}

/// One column of an import schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Header the backend expects.
    pub header: &'static str,
    /// Other spellings accepted in uploaded files.
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn new(header: &'static str, kind: FieldKind) -> Self {
        Self {
            header,
            aliases: &[],
            kind,
            required: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        self.header.eq_ignore_ascii_case(header)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(header))
    }
}

use FieldKind::{Code, Date, Number, Text, Vehicle};

const CLIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Customer Sold to", Text).required(),
    FieldSpec::new("Customer Sold to name", Text),
    FieldSpec::new("Customer Ship to", Text).required(),
    FieldSpec::new("Customer ship to name", Text),
    FieldSpec::new("Customer ship to Address", Text),
    FieldSpec::new("Customer ship to city", Text),
    FieldSpec::new("Country", Text),
    FieldSpec::new("ID Fiscal", Text),
    FieldSpec::new("ICE", Text),
    FieldSpec::new("Statut de droit", Text),
    FieldSpec::new("Statut de droit name", Text),
    FieldSpec::new("Paiement terms", Text).aliases(&["Payment terms"]),
];

const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Material", Code).required().aliases(&["Material Code"]),
    FieldSpec::new("Material description", Text).required(),
    FieldSpec::new("Base Unit of Measure", Text),
    FieldSpec::new("Tax", Number),
    FieldSpec::new("density", Number),
    FieldSpec::new("temp", Number),
];

const TANK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Plant", Text).required(),
    FieldSpec::new("Material", Code).required(),
    FieldSpec::new("Capacity", Number),
];

const TRUCK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Vehicle", Vehicle).required(),
    FieldSpec::new("MPGI", Text),
    FieldSpec::new("Vehicule Capacity", Number)
        .required()
        .aliases(&["Vehicle Capacity"]),
    FieldSpec::new("Vehicle-Type", Text),
    FieldSpec::new("Class-Group", Text),
    FieldSpec::new("Haulier name", Text),
    FieldSpec::new("Driver name", Text),
    FieldSpec::new("Driver CIN", Text),
    FieldSpec::new("Trailer Number", Vehicle),
    FieldSpec::new("Seals", Number),
    FieldSpec::new("Comp1", Number),
    FieldSpec::new("Comp2", Number),
    FieldSpec::new("Comp3", Number),
    FieldSpec::new("Comp4", Number),
    FieldSpec::new("Comp5", Number),
    FieldSpec::new("Comp6", Number),
    FieldSpec::new("Comp7", Number),
    FieldSpec::new("Comp8", Number),
    FieldSpec::new("Comp9", Number),
];

const PLANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Plant Code", Text).required().aliases(&["Plant"]),
    FieldSpec::new("Description", Text),
];

const PRICE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Material", Code).required().aliases(&["Material Code"]),
    FieldSpec::new("Customer", Text),
    FieldSpec::new("Price", Number).required(),
];

const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Sales Order", Text).required(),
    FieldSpec::new("Item", Text),
    FieldSpec::new("Order Type", Text),
    FieldSpec::new("Customer", Text).required(),
    FieldSpec::new("Customer Name", Text),
    FieldSpec::new("Ship To Party", Text),
    FieldSpec::new("Ship To Name", Text),
    FieldSpec::new("City(Ship To)", Text),
    FieldSpec::new("Plant", Text).required(),
    FieldSpec::new("Material Code", Code).required(),
    FieldSpec::new("Material Name", Text),
    FieldSpec::new("Valution Type", Text),
    FieldSpec::new("Order Qty", Number).required(),
    FieldSpec::new("Sls.UOM", Text),
    FieldSpec::new("Requested delivery date", Date),
    FieldSpec::new("Pat.Doc", Code),
    FieldSpec::new("Trip Num", Code),
    FieldSpec::new("Vehicle Id", Vehicle),
    FieldSpec::new("order_type", Text),
];

/// Columns understood by one import type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSchema {
    pub kind: ImportKind,
    pub fields: &'static [FieldSpec],
}

impl ImportSchema {
    /// Schema for an import type.
    #[must_use]
    pub const fn for_kind(kind: ImportKind) -> Self {
        let fields = match kind {
            ImportKind::Clients => CLIENT_FIELDS,
            ImportKind::Products => PRODUCT_FIELDS,
            ImportKind::Tanks => TANK_FIELDS,
            ImportKind::Trucks => TRUCK_FIELDS,
            ImportKind::Plants => PLANT_FIELDS,
            ImportKind::Prices => PRICE_FIELDS,
            ImportKind::Orders => ORDER_FIELDS,
        };
        Self { kind, fields }
    }

    /// Field definition for a canonical header.
    #[must_use]
    pub fn field(&self, header: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.header == header)
    }

    /// Resolve file headers against the schema and key every row by
    /// canonical header.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::EmptyFile`] for a file without data rows and
    /// [`ImportError::MissingColumns`] when a required column is absent.
    pub fn map_table(&self, table: RawTable) -> Result<Dataset, ImportError> {
        if table.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let resolved: Vec<String> = table
            .headers
            .iter()
            .map(|h| {
                self.fields
                    .iter()
                    .find(|f| f.matches(h))
                    .map_or_else(|| h.trim().to_string(), |f| f.header.to_string())
            })
            .collect();

        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.required && !resolved.iter().any(|h| h == f.header))
            .map(|f| f.header.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let mut columns: Vec<String> = Vec::with_capacity(resolved.len());
        for header in &resolved {
            if !header.is_empty() && !columns.contains(header) {
                columns.push(header.clone());
            }
        }

        let records = table
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| {
                let mut values = BTreeMap::new();
                for (header, cell) in resolved.iter().zip(cells) {
                    if !header.is_empty() {
                        values.entry(header.clone()).or_insert(cell);
                    }
                }
                Record {
                    row: index + 1,
                    values,
                }
            })
            .collect();

        Ok(Dataset {
            schema: *self,
            columns,
            records,
        })
    }
}

/// One data row keyed by canonical header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// 1-based position among the file's data rows.
    pub row: usize,
    pub values: BTreeMap<String, String>,
}

impl Record {
    /// Cell value, empty when the column is absent.
    #[must_use]
    pub fn get(&self, header: &str) -> &str {
        self.values.get(header).map_or("", String::as_str)
    }

    pub fn set(&mut self, header: &str, value: impl Into<String>) {
        self.values.insert(header.to_string(), value.into());
    }

    /// The row as a JSON object of string values.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect()
    }
}

/// A mapped file: column order plus keyed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub schema: ImportSchema,
    /// Canonical headers in file order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn kind(&self) -> ImportKind {
        self.schema.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ensure a column exists, appending it when the file lacked it.
    pub fn ensure_column(&mut self, header: &str) {
        if !self.columns.iter().any(|c| c == header) {
            self.columns.push(header.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in ImportKind::ALL {
            let schema = ImportSchema::for_kind(kind);
            assert_eq!(schema.kind, kind);
            assert!(schema.fields.iter().any(|f| f.required));
        }
    }

    #[test]
    fn test_headers_resolve_case_insensitively_and_by_alias() {
        let schema = ImportSchema::for_kind(ImportKind::Trucks);
        let dataset = schema
            .map_table(table(
                &["vehicle", "Vehicle Capacity", "Depot notes"],
                &[&["12345-A-6", "30000", "north"]],
            ))
            .unwrap();
        assert_eq!(dataset.columns, vec!["Vehicle", "Vehicule Capacity", "Depot notes"]);
        let record = &dataset.records[0];
        assert_eq!(record.row, 1);
        assert_eq!(record.get("Vehicule Capacity"), "30000");
        assert_eq!(record.get("Depot notes"), "north");
        assert_eq!(record.get("Seals"), "");
    }

    #[test]
    fn test_missing_required_columns_reject_the_file() {
        let schema = ImportSchema::for_kind(ImportKind::Orders);
        let err = schema
            .map_table(table(&["Sales Order", "Customer"], &[&["1", "C"]]))
            .unwrap_err();
        match err {
            ImportError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["Plant", "Material Code", "Order Qty"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let schema = ImportSchema::for_kind(ImportKind::Plants);
        let err = schema.map_table(table(&["Plant Code"], &[])).unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile));
    }
}
