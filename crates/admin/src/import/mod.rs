//! Spreadsheet import pipeline.
//!
//! An upload goes through five sequential steps:
//!
//! 1. **Parse** the file into header-keyed rows (CSV, XLSX or XLS).
//! 2. **Map and clean** the rows against the [`ImportSchema`] of the
//!    selected type (leading zeros, vehicle separators, decimal commas).
//! 3. **Validate** references against the [`LookupCache`]. Problems are
//!    collected per row; if any row fails, the whole file is rejected
//!    before the first network call.
//! 4. **Rewrite** internal depot transfers (ZCON orders).
//! 5. **Submit** fixed-size batches one after the other. A failed batch
//!    stops the run and hands back the progress made so far.
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = ImportPipeline::new(&api, &lookup, 100)
//!     .on_progress(|p| println!("{}%", p.percent));
//! let report = pipeline.run(ImportKind::Orders, "orders.xlsx", &bytes).await?;
//! ```

mod batch;
mod clean;
mod parse;
mod report;
mod schema;
mod validate;
mod zcon;

pub use batch::{Batch, BatchSink, CancelToken, Progress, batch_count, encode_csv};
pub use clean::{clean, clean_value, parse_date};
pub use parse::{FileFormat, RawTable, parse_csv, parse_file, parse_spreadsheet};
pub use report::{BatchOutcome, ImportReport, NO_PRICE_FOUND, percent};
pub use schema::{Dataset, FieldKind, FieldSpec, ImportSchema, Record};
pub use validate::{RowError, ZCON, is_zcon, validate};
pub use zcon::TRANSFER_CITY;

use fuelops_core::ImportKind;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiError, Order};
use crate::lookup::LookupCache;

/// Rows shown by the preview.
pub const PREVIEW_ROWS: usize = 5;

/// Errors that stop an import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format: {0}. Please use Excel (.xlsx, .xls) or CSV (.csv) files.")]
    UnsupportedFormat(String),

    #[error("The file contains no data rows")]
    EmptyFile,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// At least one row failed validation; nothing was sent.
    #[error("Validation failed: {}", join_rows(.0))]
    Rejected(Vec<RowError>),

    /// A cleaned row could not be turned into an order line.
    #[error("Row {row}: {message}")]
    Decode { row: usize, message: String },

    #[error("Failed to encode batch: {0}")]
    Encode(String),

    /// A batch was refused; later batches were not sent.
    #[error("Error importing {kind} batch {batch}: {source}")]
    BatchFailed {
        kind: ImportKind,
        batch: usize,
        source: ApiError,
        partial: Box<ImportReport>,
    },
}

fn join_rows(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// First rows of a file with the total count, shown before importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub total_records: usize,
}

/// Parse and map a file without validating or sending anything.
///
/// # Errors
///
/// Returns error if the file cannot be parsed or lacks required columns.
pub fn preview(kind: ImportKind, file_name: &str, bytes: &[u8]) -> Result<ImportPreview, ImportError> {
    let dataset = ImportSchema::for_kind(kind).map_table(parse_file(file_name, bytes)?)?;
    Ok(ImportPreview {
        total_records: dataset.len(),
        rows: dataset.records.iter().take(PREVIEW_ROWS).cloned().collect(),
        columns: dataset.columns,
    })
}

/// A validated import ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImport {
    pub dataset: Dataset,
    /// Typed order lines, for order imports only.
    pub orders: Vec<Order>,
}

impl PreparedImport {
    #[must_use]
    pub fn kind(&self) -> ImportKind {
        self.dataset.kind()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

type ProgressFn<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Runs imports against a [`BatchSink`].
pub struct ImportPipeline<'a, S> {
    sink: &'a S,
    lookup: &'a LookupCache,
    batch_size: usize,
    cancel: CancelToken,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a, S: BatchSink> ImportPipeline<'a, S> {
    /// Create a pipeline; a zero batch size is treated as one.
    pub fn new(sink: &'a S, lookup: &'a LookupCache, batch_size: usize) -> Self {
        Self {
            sink,
            lookup,
            batch_size: batch_size.max(1),
            cancel: CancelToken::new(),
            on_progress: None,
        }
    }

    /// Use a caller-owned cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Register a callback invoked after every accepted batch.
    #[must_use]
    pub fn on_progress(mut self, callback: impl Fn(Progress) + Send + Sync + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Parse, clean, validate and transform a file.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Rejected`] with every row problem when any row
    /// fails validation, or a parse error for unreadable files.
    #[instrument(skip(self, bytes), fields(kind = %kind, bytes = bytes.len()))]
    pub fn prepare(
        &self,
        kind: ImportKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PreparedImport, ImportError> {
        let table = parse_file(file_name, bytes)?;
        let mut dataset = ImportSchema::for_kind(kind).map_table(table)?;
        clean(&mut dataset);

        let errors = validate(&dataset, self.lookup);
        if !errors.is_empty() {
            for e in &errors {
                warn!(row = e.row, error = %e.message, "Import row rejected");
            }
            return Err(ImportError::Rejected(errors));
        }

        let orders = if kind == ImportKind::Orders {
            zcon::apply(&mut dataset, self.lookup);
            to_orders(&dataset)?
        } else {
            Vec::new()
        };

        debug!(rows = dataset.len(), "Import validated");
        Ok(PreparedImport { dataset, orders })
    }

    /// Send a prepared import in sequential batches.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::BatchFailed`] with the partial report when a
    /// batch request fails.
    #[instrument(skip(self, prepared), fields(kind = %prepared.kind(), rows = prepared.len()))]
    pub async fn submit(&self, prepared: &PreparedImport) -> Result<ImportReport, ImportError> {
        let kind = prepared.kind();
        let total = prepared.len();
        let batches = batch_count(total, self.batch_size);
        let mut report = ImportReport::new(kind, total);

        for index in 0..batches {
            if self.cancel.is_cancelled() {
                warn!(sent = report.batches_sent, batches, "Import cancelled");
                report.cancelled = true;
                break;
            }

            let start = index * self.batch_size;
            let end = (start + self.batch_size).min(total);
            let batch = if kind == ImportKind::Orders {
                Batch::Orders(prepared.orders.get(start..end).unwrap_or_default())
            } else {
                Batch::MasterData {
                    kind,
                    file_name: format!("{kind}_batch_{}.csv", index + 1),
                    csv: encode_csv(
                        &prepared.dataset.columns,
                        prepared.dataset.records.get(start..end).unwrap_or_default(),
                    )?,
                }
            };

            match self.sink.submit(batch).await {
                Ok(outcome) => {
                    report.absorb(end - start, outcome);
                    debug!(
                        batch = index + 1,
                        batches,
                        imported = report.records_imported,
                        "Batch accepted"
                    );
                    self.notify(Progress {
                        batch: index + 1,
                        batches,
                        rows_submitted: report.rows_submitted,
                        total_rows: total,
                        percent: report.progress_percent(),
                    });
                }
                Err(source) => {
                    error!(batch = index + 1, error = %source, "Import batch failed");
                    return Err(ImportError::BatchFailed {
                        kind,
                        batch: index + 1,
                        source,
                        partial: Box::new(report),
                    });
                }
            }
        }

        for warning in &report.warnings {
            warn!(row = ?warning.row, error = %warning.error, "Price missing for imported row");
        }
        info!(
            imported = report.records_imported,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Import finished"
        );
        Ok(report)
    }

    /// Prepare and submit a file.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`] and [`Self::submit`].
    pub async fn run(
        &self,
        kind: ImportKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportReport, ImportError> {
        let prepared = self.prepare(kind, file_name, bytes)?;
        self.submit(&prepared).await
    }

    fn notify(&self, progress: Progress) {
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }
}

fn to_orders(dataset: &Dataset) -> Result<Vec<Order>, ImportError> {
    dataset
        .records
        .iter()
        .map(|record| {
            serde_json::from_value(serde_json::Value::Object(record.to_json())).map_err(|e| {
                ImportError::Decode {
                    row: record.row,
                    message: e.to_string(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use fuelops_core::OrderRegime;

    use super::*;
    use crate::api::{Client, Plant, Product, ReferenceData};

    /// Records every batch and fails on a chosen call.
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(usize, String)>>,
        fail_on: Option<usize>,
    }

    impl BatchSink for RecordingSink {
        async fn submit(&self, batch: Batch<'_>) -> Result<BatchOutcome, ApiError> {
            let (rows, label) = match batch {
                Batch::Orders(orders) => (orders.len(), "orders".to_string()),
                Batch::MasterData { csv, file_name, .. } => {
                    let text = String::from_utf8(csv).unwrap();
                    (text.lines().count() - 1, file_name)
                }
            };
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((rows, label));
                calls.len()
            };
            if self.fail_on == Some(call) {
                return Err(ApiError::Api {
                    status: 500,
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(BatchOutcome {
                created: rows,
                ..BatchOutcome::default()
            })
        }
    }

    fn lookup() -> LookupCache {
        LookupCache::new(ReferenceData {
            products: vec![Product {
                material: "200123".to_string(),
                ..Product::default()
            }],
            clients: vec![Client {
                sold_to: "100234".to_string(),
                ship_to: "500777".to_string(),
                ..Client::default()
            }],
            plants: vec![Plant {
                code: "1020".to_string(),
                description: Some("Depot Mohammedia".to_string()),
                ..Plant::default()
            }],
            trucks: Vec::new(),
        })
    }

    fn clients_csv(rows: usize) -> String {
        let mut csv = String::from("Customer Sold to,Customer Sold to name,Customer Ship to\n");
        for i in 0..rows {
            csv.push_str(&format!("{},Client {i},{}\n", 100_000 + i, 500_000 + i));
        }
        csv
    }

    #[tokio::test]
    async fn test_150_clients_go_out_in_two_batches() {
        let sink = RecordingSink::default();
        let lookup = LookupCache::default();
        let seen = Mutex::new(Vec::new());
        let pipeline = ImportPipeline::new(&sink, &lookup, 100).on_progress(|p| {
            seen.lock().unwrap().push(p.percent);
        });

        let report = pipeline
            .run(ImportKind::Clients, "clients.csv", clients_csv(150).as_bytes())
            .await
            .unwrap();

        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (100, "clients_batch_1.csv".to_string()));
        assert_eq!(calls[1].0, 50);
        assert_eq!(report.records_imported, 150);
        assert!(report.errors.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![67, 100]);
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let sink = RecordingSink::default();
        let lookup = lookup();
        let pipeline = ImportPipeline::new(&sink, &lookup, 100);
        let csv = "Sales Order,Customer,Ship To Party,Plant,Material Code,Order Qty\n\
                   1,100234,500777,1020,200123,100\n\
                   2,100234,500777,1020,404,100\n";

        let err = pipeline
            .run(ImportKind::Orders, "orders.csv", csv.as_bytes())
            .await
            .unwrap_err();

        match err {
            ImportError::Rejected(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sink.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_stops_and_keeps_partial_progress() {
        let sink = RecordingSink {
            fail_on: Some(2),
            ..RecordingSink::default()
        };
        let lookup = LookupCache::default();
        let pipeline = ImportPipeline::new(&sink, &lookup, 100);

        let err = pipeline
            .run(ImportKind::Clients, "clients.csv", clients_csv(250).as_bytes())
            .await
            .unwrap_err();

        assert_eq!(sink.calls.lock().unwrap().len(), 2);
        match err {
            ImportError::BatchFailed {
                batch, partial, ..
            } => {
                assert_eq!(batch, 2);
                assert_eq!(partial.records_imported, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_batch() {
        let sink = RecordingSink::default();
        let lookup = LookupCache::default();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let pipeline = ImportPipeline::new(&sink, &lookup, 100)
            .with_cancel_token(cancel)
            .on_progress(move |_| trigger.cancel());

        let report = pipeline
            .run(ImportKind::Clients, "clients.csv", clients_csv(250).as_bytes())
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.batches_sent, 1);
        assert_eq!(sink.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prepare_orders_applies_zcon_and_types_rows() {
        let sink = RecordingSink::default();
        let lookup = lookup();
        let pipeline = ImportPipeline::new(&sink, &lookup, 100);
        let csv = "Sales Order,Item,Order Type,Customer,Plant,Material Code,Order Qty,order_type\n\
                   4500012,10,ZCON,1020,1020,000200123,12000,VRAC\n";

        let prepared = pipeline.prepare(ImportKind::Orders, "orders.csv", csv.as_bytes()).unwrap();

        let order = &prepared.orders[0];
        assert_eq!(order.customer, "CP1020");
        assert_eq!(order.ship_to_party.as_deref(), Some("CP1020"));
        assert_eq!(order.ship_to_city.as_deref(), Some("Casablanca"));
        assert_eq!(order.customer_name.as_deref(), Some("Depot Mohammedia"));
        assert_eq!(order.material_code, "200123");
        assert!((order.quantity - 12000.0).abs() < f64::EPSILON);
        assert_eq!(order.regime, Some(OrderRegime::Vrac));
    }

    #[test]
    fn test_preview_shows_five_rows_and_total() {
        let preview = preview(ImportKind::Clients, "clients.csv", clients_csv(12).as_bytes()).unwrap();
        assert_eq!(preview.total_records, 12);
        assert_eq!(preview.rows.len(), PREVIEW_ROWS);
        assert_eq!(preview.columns[0], "Customer Sold to");
    }
}
