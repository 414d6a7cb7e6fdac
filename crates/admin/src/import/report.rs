//! Import outcome accumulated across batches.

use fuelops_core::ImportKind;

use crate::api::{BackendRowError, ImportResponse, ImportSuccess, OrderImportResponse};

/// Backend error text marking a missing price, reported as a warning.
pub const NO_PRICE_FOUND: &str = "No price found";

/// What one accepted batch produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub created: usize,
    pub errors: Vec<BackendRowError>,
    pub successes: Vec<ImportSuccess>,
}

impl From<OrderImportResponse> for BatchOutcome {
    fn from(response: OrderImportResponse) -> Self {
        Self {
            created: response.orders_created,
            errors: response.errors,
            successes: Vec::new(),
        }
    }
}

impl From<ImportResponse> for BatchOutcome {
    fn from(response: ImportResponse) -> Self {
        Self {
            created: response.records_imported,
            errors: response.errors,
            successes: response.successes,
        }
    }
}

/// Result of one import invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub kind: ImportKind,
    /// Rows that passed validation.
    pub total_rows: usize,
    /// Rows sent to the backend so far.
    pub rows_submitted: usize,
    pub batches_sent: usize,
    pub records_imported: usize,
    /// Hard per-row errors reported by the backend.
    pub errors: Vec<BackendRowError>,
    /// Missing-price rows; the rest of the row was accepted.
    pub warnings: Vec<BackendRowError>,
    pub successes: Vec<ImportSuccess>,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
}

impl ImportReport {
    #[must_use]
    pub const fn new(kind: ImportKind, total_rows: usize) -> Self {
        Self {
            kind,
            total_rows,
            rows_submitted: 0,
            batches_sent: 0,
            records_imported: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            successes: Vec::new(),
            cancelled: false,
        }
    }

    /// Fold one batch outcome into the report.
    ///
    /// The backend numbers rows within the batch it received; they are
    /// shifted by the rows already submitted so they point into the whole
    /// import.
    pub fn absorb(&mut self, rows: usize, outcome: BatchOutcome) {
        let offset = self.rows_submitted;
        self.batches_sent += 1;
        self.rows_submitted += rows;
        self.records_imported += outcome.created;
        self.successes.extend(outcome.successes);
        for mut error in outcome.errors {
            error.row = error.row.map(|row| row + offset);
            if error.error.contains(NO_PRICE_FOUND) {
                self.warnings.push(error);
            } else {
                self.errors.push(error);
            }
        }
    }

    /// Share of rows submitted, rounded to whole percent.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        percent(self.rows_submitted, self.total_rows)
    }

    /// Whether every row went through without error or warning.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.errors.is_empty() && self.warnings.is_empty()
    }

    /// One-line summary for notifications.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.cancelled {
            format!(
                "Import cancelled after {} of {} rows ({} imported)",
                self.rows_submitted, self.total_rows, self.records_imported
            )
        } else if self.warnings.is_empty() && self.errors.is_empty() {
            format!("Successfully imported {} {}", self.records_imported, self.kind)
        } else {
            format!(
                "Imported {} {} with {} errors and {} price-related warnings",
                self.records_imported,
                self.kind,
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

/// `done / total` as a rounded percentage, 100 when there is nothing to do.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (done.min(total) * 200 + total) / (total * 2);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_error(text: &str) -> BackendRowError {
        BackendRowError {
            row: Some(1),
            error: text.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_absorb_splits_price_warnings() {
        let mut report = ImportReport::new(ImportKind::Orders, 150);
        report.absorb(
            100,
            BatchOutcome {
                created: 99,
                errors: vec![row_error("No price found for product 200123 and customer 100234")],
                successes: Vec::new(),
            },
        );
        report.absorb(
            50,
            BatchOutcome {
                created: 49,
                errors: vec![row_error("Duplicate order line")],
                successes: Vec::new(),
            },
        );
        assert_eq!(report.records_imported, 148);
        assert_eq!(report.batches_sent, 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.progress_percent(), 100);
        assert!(!report.is_clean());
        assert_eq!(report.warnings[0].row, Some(1));
        assert_eq!(report.errors[0].row, Some(101));
    }

    #[test]
    fn test_rows_without_number_stay_unnumbered() {
        let mut report = ImportReport::new(ImportKind::Products, 20);
        report.absorb(10, BatchOutcome::default());
        report.absorb(
            10,
            BatchOutcome {
                errors: vec![BackendRowError {
                    row: None,
                    error: "Invalid density".to_string(),
                    data: None,
                }],
                ..BatchOutcome::default()
            },
        );
        assert_eq!(report.errors[0].row, None);
        assert_eq!(report.rows_submitted, 20);
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0, 150), 0);
        assert_eq!(percent(100, 150), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn test_summary() {
        let mut report = ImportReport::new(ImportKind::Clients, 150);
        report.absorb(150, BatchOutcome {
            created: 150,
            ..BatchOutcome::default()
        });
        assert_eq!(report.summary(), "Successfully imported 150 clients");
    }
}
