//! Sequential batch submission.
//!
//! Batches go out one at a time so that progress can be reported between
//! them and so the backend never sees more than one batch per import.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fuelops_core::ImportKind;

use super::{BatchOutcome, ImportError, Record};
use crate::api::{ApiClient, ApiError, Order};

/// One chunk of an import, in the shape its endpoint expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch<'a> {
    /// Order lines for `POST /orders/import`.
    Orders(&'a [Order]),
    /// A CSV file for `POST /import/:type`.
    MasterData {
        kind: ImportKind,
        file_name: String,
        csv: Vec<u8>,
    },
}

/// Destination of import batches.
pub trait BatchSink: Sync {
    /// Submit one batch and report what the backend accepted.
    fn submit(&self, batch: Batch<'_>) -> impl Future<Output = Result<BatchOutcome, ApiError>> + Send;
}

impl BatchSink for ApiClient {
    async fn submit(&self, batch: Batch<'_>) -> Result<BatchOutcome, ApiError> {
        match batch {
            Batch::Orders(orders) => self.import_orders(orders).await.map(BatchOutcome::from),
            Batch::MasterData {
                kind,
                file_name,
                csv,
            } => self
                .import_file(kind, &file_name, csv)
                .await
                .map(BatchOutcome::from),
        }
    }
}

/// Cooperative cancellation flag, checked before each batch.
///
/// Cancelling never aborts a request already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress reported after each accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based number of the batch just accepted.
    pub batch: usize,
    pub batches: usize,
    pub rows_submitted: usize,
    pub total_rows: usize,
    pub percent: u8,
}

/// Number of batches needed for `rows` rows.
#[must_use]
pub const fn batch_count(rows: usize, batch_size: usize) -> usize {
    rows.div_ceil(if batch_size == 0 { 1 } else { batch_size })
}

/// Encode records as CSV with the given column order.
///
/// # Errors
///
/// Returns error if the CSV writer fails.
pub fn encode_csv(columns: &[String], records: &[Record]) -> Result<Vec<u8>, ImportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| record.get(c)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ImportError::Encode(e.to_string()))
}
