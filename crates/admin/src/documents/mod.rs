//! Delivery documents: invoices, delivery notes and loading slips.
//!
//! Documents are rendered locally from a trip fetched with its orders:
//!
//! 1. Lines are grouped by sold-to customer (one invoice and one delivery
//!    note per customer; one loading slip per trip)
//! 2. Each group is rendered through an Askama template to HTML
//! 3. The HTML is converted by a [`PdfRenderer`], one document at a time
//! 4. The PDF is written to the output directory
//!
//! A trip without orders is an error, never an empty document.

mod pdf;
mod templates;
mod totals;
mod words;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use askama::Template;
use chrono::{Local, NaiveDateTime};
use fuelops_core::OrderId;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub use pdf::{CommandPdfRenderer, PdfRenderer};
pub use templates::{
    DeliveryNoteTemplate, InvoiceTemplate, Letterhead, LoadingSlipTemplate, Party,
};
pub use totals::{
    CustomerGroup, InvoiceTotals, PAYMENT_DELAY_MONTHS, ProductTotal, due_date, group_by_customer,
    product_totals, unit_price,
};
pub use words::{AmountSpeller, FrenchAmountSpeller};

use crate::api::{ApiClient, Trip};
use crate::config::DocumentConfig;
use crate::error::AppError;

/// Errors that can occur when producing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("No orders found for this trip")]
    NoOrders,

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("PDF conversion failed: {0}")]
    Converter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown document type: {0}")]
    UnknownKind(String),
}

/// Documents the console can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Invoice,
    DeliveryNote,
    LoadingSlip,
}

impl DocumentKind {
    pub const ALL: [Self; 3] = [Self::Invoice, Self::DeliveryNote, Self::LoadingSlip];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::DeliveryNote => "delivery_note",
            Self::LoadingSlip => "loading_slip",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| DocumentError::UnknownKind(s.to_string()))
    }
}

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub path: PathBuf,
    /// Sold-to customer, for per-customer documents.
    pub customer: Option<String>,
}

/// `invoice_{tripNum}_{customerId}.pdf`
#[must_use]
pub fn invoice_file_name(trip_num: &str, customer: &str) -> String {
    format!("invoice_{trip_num}_{customer}.pdf")
}

/// `delivery_note_{tripNum}_{customerId}.pdf`
#[must_use]
pub fn delivery_note_file_name(trip_num: &str, customer: &str) -> String {
    format!("delivery_note_{trip_num}_{customer}.pdf")
}

/// `loading_slip_{tripId}.pdf`
#[must_use]
pub fn loading_slip_file_name(trip_id: &str) -> String {
    format!("loading_slip_{trip_id}.pdf")
}

/// One rendered page before PDF conversion.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub file_name: String,
    pub customer: Option<String>,
    pub html: String,
}

/// Renders trips to PDF files.
pub struct DocumentGenerator<R = CommandPdfRenderer> {
    renderer: R,
    letterhead: Letterhead,
    output_dir: PathBuf,
    speller: Box<dyn AmountSpeller>,
}

impl DocumentGenerator<CommandPdfRenderer> {
    /// Generator using the configured external converter.
    ///
    /// # Errors
    ///
    /// Returns error if the converter command line is empty.
    pub fn from_config(config: &DocumentConfig) -> Result<Self, DocumentError> {
        Ok(Self::new(
            CommandPdfRenderer::from_command_line(&config.pdf_command)?,
            Letterhead::from_config(config),
            config.output_dir.clone(),
        ))
    }
}

impl<R: PdfRenderer> DocumentGenerator<R> {
    pub fn new(renderer: R, letterhead: Letterhead, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            letterhead,
            output_dir: output_dir.into(),
            speller: Box::new(FrenchAmountSpeller),
        }
    }

    /// Replace the amount speller used on invoices.
    #[must_use]
    pub fn with_speller(mut self, speller: Box<dyn AmountSpeller>) -> Self {
        self.speller = speller;
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the HTML pages of a document without converting them.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NoOrders`] for a trip without orders, or a
    /// template error.
    pub fn render_pages(
        &self,
        kind: DocumentKind,
        trip: &Trip,
        now: NaiveDateTime,
    ) -> Result<Vec<RenderedPage>, DocumentError> {
        if trip.orders.is_empty() {
            return Err(DocumentError::NoOrders);
        }

        match kind {
            DocumentKind::Invoice => group_by_customer(&trip.orders)
                .iter()
                .map(|group| {
                    let view = InvoiceTemplate::build(
                        trip,
                        group,
                        &self.letterhead,
                        now.date(),
                        self.speller.as_ref(),
                    );
                    Ok(RenderedPage {
                        file_name: invoice_file_name(&trip.trip_num, group.sold_to),
                        customer: Some(group.sold_to.to_string()),
                        html: view.render()?,
                    })
                })
                .collect(),
            DocumentKind::DeliveryNote => group_by_customer(&trip.orders)
                .iter()
                .map(|group| {
                    let view = DeliveryNoteTemplate::build(trip, group, &self.letterhead, now);
                    Ok(RenderedPage {
                        file_name: delivery_note_file_name(&trip.trip_num, group.sold_to),
                        customer: Some(group.sold_to.to_string()),
                        html: view.render()?,
                    })
                })
                .collect(),
            DocumentKind::LoadingSlip => {
                let trip_id = trip
                    .id
                    .map_or_else(|| trip.trip_num.clone(), |id| id.to_string());
                let view = LoadingSlipTemplate::build(trip, &self.letterhead, now);
                Ok(vec![RenderedPage {
                    file_name: loading_slip_file_name(&trip_id),
                    customer: None,
                    html: view.render()?,
                }])
            }
        }
    }

    /// Render, convert and write a document for a trip.
    ///
    /// Pages are converted one after the other.
    ///
    /// # Errors
    ///
    /// Returns error on a trip without orders, or if rendering, conversion
    /// or writing fails. Files written before the failure are kept.
    #[instrument(skip(self, trip), fields(kind = %kind, trip_num = %trip.trip_num))]
    pub async fn generate(
        &self,
        kind: DocumentKind,
        trip: &Trip,
    ) -> Result<Vec<GeneratedDocument>, DocumentError> {
        let pages = self.render_pages(kind, trip, Local::now().naive_local())?;
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let bytes = self.renderer.render(&page.html).await?;
            let path = self.output_dir.join(&page.file_name);
            tokio::fs::write(&path, &bytes).await?;
            debug!(path = %path.display(), bytes = bytes.len(), "Document written");
            written.push(GeneratedDocument {
                kind,
                path,
                customer: page.customer,
            });
        }

        info!(count = written.len(), "Documents generated");
        Ok(written)
    }
}

/// Documents rendered by the backend for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerDocument {
    Invoice,
    DeliveryNote,
}

/// Download a backend-rendered PDF into `output_dir`.
///
/// # Errors
///
/// Returns error if the download or the write fails.
#[instrument(skip(api, output_dir), fields(order_id = %order_id))]
pub async fn save_server_document(
    api: &ApiClient,
    document: ServerDocument,
    order_id: OrderId,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    let (bytes, file_name) = match document {
        ServerDocument::Invoice => (
            api.invoice_pdf(order_id).await?,
            format!("invoice_order_{order_id}.pdf"),
        ),
        ServerDocument::DeliveryNote => (
            api.delivery_note_pdf(order_id).await?,
            format!("delivery_note_order_{order_id}.pdf"),
        ),
    };
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(DocumentError::from)?;
    let path = output_dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(DocumentError::from)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use fuelops_core::TripId;

    use super::*;
    use crate::api::{Client, Order};

    /// Returns the HTML bytes and remembers every call.
    #[derive(Default)]
    struct EchoRenderer {
        calls: Mutex<Vec<usize>>,
    }

    impl PdfRenderer for EchoRenderer {
        async fn render(&self, html: &str) -> Result<Vec<u8>, DocumentError> {
            self.calls.lock().unwrap().push(html.len());
            Ok(html.as_bytes().to_vec())
        }
    }

    fn line(customer: &str) -> Order {
        Order {
            sales_order: "4500012".to_string(),
            customer: customer.to_string(),
            customer_info: Some(Client {
                sold_to: customer.to_string(),
                ..Client::default()
            }),
            quantity: 5000.0,
            ..Order::default()
        }
    }

    fn trip() -> Trip {
        Trip {
            id: Some(TripId::new(12)),
            trip_num: "55".to_string(),
            orders: vec![line("100234"), line("100777"), line("100234")],
            ..Trip::default()
        }
    }

    #[tokio::test]
    async fn test_one_invoice_per_customer() {
        let dir = tempfile::tempdir().unwrap();
        let generator =
            DocumentGenerator::new(EchoRenderer::default(), Letterhead::default(), dir.path());
        let docs = generator
            .generate(DocumentKind::Invoice, &trip())
            .await
            .unwrap();
        let names: Vec<String> = docs
            .iter()
            .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["invoice_55_100234.pdf", "invoice_55_100777.pdf"]);
        assert_eq!(generator.renderer.calls.lock().unwrap().len(), 2);
        assert!(docs[0].path.exists());
    }

    #[tokio::test]
    async fn test_loading_slip_named_after_trip_id() {
        let dir = tempfile::tempdir().unwrap();
        let generator =
            DocumentGenerator::new(EchoRenderer::default(), Letterhead::default(), dir.path());
        let docs = generator
            .generate(DocumentKind::LoadingSlip, &trip())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].path.ends_with("loading_slip_12.pdf"));
        assert_eq!(docs[0].customer, None);
    }

    #[tokio::test]
    async fn test_trip_without_orders_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator =
            DocumentGenerator::new(EchoRenderer::default(), Letterhead::default(), dir.path());
        let empty = Trip {
            trip_num: "56".to_string(),
            ..Trip::default()
        };
        let err = generator
            .generate(DocumentKind::DeliveryNote, &empty)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::NoOrders));
        assert!(generator.renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_document_kind_parsing() {
        assert_eq!(
            "delivery-note".parse::<DocumentKind>().unwrap(),
            DocumentKind::DeliveryNote
        );
        assert_eq!("INVOICE".parse::<DocumentKind>().unwrap(), DocumentKind::Invoice);
        assert!("receipt".parse::<DocumentKind>().is_err());
    }
}
