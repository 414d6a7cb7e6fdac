//! End-of-day reports and the dashboard summary.
//!
//! - Daily orders export as CSV (`orders_report_{date}.csv`)
//! - Completed orders over a date range as XLSX
//!   (`Completed_Orders_{start}_to_{end}.xlsx`)
//! - Dashboard counters
//! - Import history

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fuelops_core::OrderStatus;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ImportHistoryPage, Order, OrderFilter, Page};
use crate::error::AppError;

/// Column headers of order exports, in order.
pub const ORDER_REPORT_HEADERS: [&str; 23] = [
    "Sales Order",
    "Order Type",
    "Customer",
    "Customer Name",
    "Plant",
    "Plant Name",
    "Ship To Party",
    "Ship To Name",
    "Valution Type",
    "City(Ship To)",
    "Item",
    "Material Code",
    "Material Name",
    "Order Qty",
    "Sls.UOM",
    "Requested delivery date",
    "Pat.Doc",
    "Trip Num",
    "Tour Start Date",
    "Org Name",
    "Driver Name",
    "Vehicle Id",
    "Status",
];

/// Activity entries shown on the dashboard.
pub const RECENT_ACTIVITY: usize = 5;

/// Errors that can occur when writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

// =============================================================================
// Order exports
// =============================================================================

#[must_use]
pub fn daily_report_file_name(date: NaiveDate) -> String {
    format!("orders_report_{}.csv", date.format("%Y-%m-%d"))
}

#[must_use]
pub fn completed_orders_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "Completed_Orders_{}_to_{}.xlsx",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// Report cells of an order, one per header.
fn report_cells(order: &Order) -> Vec<String> {
    let value = serde_json::to_value(order).unwrap_or(Value::Null);
    ORDER_REPORT_HEADERS
        .iter()
        .map(|header| match value.get(header) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
        })
        .collect()
}

/// Orders as CSV with [`ORDER_REPORT_HEADERS`].
///
/// # Errors
///
/// Returns error if a record cannot be written.
pub fn orders_csv(orders: &[Order]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ORDER_REPORT_HEADERS)?;
    for order in orders {
        writer.write_record(report_cells(order))?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}

/// Orders as an XLSX workbook with a bold header row.
///
/// # Errors
///
/// Returns error if the workbook cannot be built.
pub fn orders_xlsx(orders: &[Order]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Completed Orders")?;

    let header_format = Format::new().set_bold();
    for (col, header) in (0u16..).zip(ORDER_REPORT_HEADERS) {
        sheet.write_string_with_format(0, col, header, &header_format)?;
    }

    for (row, order) in (1u32..).zip(orders) {
        for (col, (header, cell)) in (0u16..).zip(ORDER_REPORT_HEADERS.iter().zip(report_cells(order))) {
            if *header == "Order Qty" {
                sheet.write_number(row, col, order.quantity)?;
            } else {
                sheet.write_string(row, col, cell)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

async fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Export the orders of one delivery day to CSV.
///
/// # Errors
///
/// Returns error if the orders cannot be fetched or the file written.
#[instrument(skip(api, output_dir), fields(date = %date))]
pub async fn export_daily_orders(
    api: &ApiClient,
    date: NaiveDate,
    output_dir: &Path,
) -> Result<(PathBuf, usize), AppError> {
    let filter = OrderFilter {
        date: Some(date),
        ..OrderFilter::default()
    };
    let orders = api.list_orders(&filter).await?;
    let bytes = orders_csv(&orders)?;
    let path = write_file(output_dir, &daily_report_file_name(date), &bytes).await?;
    debug!(rows = orders.len(), path = %path.display(), "Daily report written");
    Ok((path, orders.len()))
}

/// Export completed orders between two dates (inclusive) to XLSX.
///
/// # Errors
///
/// Returns error for an inverted range, or if the orders cannot be fetched
/// or the file written.
#[instrument(skip(api, output_dir), fields(start = %start, end = %end))]
pub async fn export_completed_orders(
    api: &ApiClient,
    start: NaiveDate,
    end: NaiveDate,
    output_dir: &Path,
) -> Result<(PathBuf, usize), AppError> {
    if start > end {
        return Err(ReportError::InvalidRange { start, end }.into());
    }
    let filter = OrderFilter {
        status: Some(OrderStatus::Completed),
        start_date: Some(start),
        end_date: Some(end),
        ..OrderFilter::default()
    };
    let orders = api.list_orders(&filter).await?;
    let bytes = orders_xlsx(&orders)?;
    let path = write_file(output_dir, &completed_orders_file_name(start, end), &bytes).await?;
    debug!(rows = orders.len(), path = %path.display(), "Completed orders written");
    Ok((path, orders.len()))
}

// =============================================================================
// Dashboard
// =============================================================================

/// One recent order on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub message: String,
    pub delivery_date: Option<String>,
}

/// Headline counters.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub active_trucks: usize,
    pub total_clients: usize,
    pub total_products: usize,
    /// Sum of ordered quantities, in litres.
    pub fuel_delivered: f64,
    /// Order lines per status, in lifecycle order.
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Most recent orders first.
    pub recent_activity: Vec<Activity>,
}

impl DashboardSummary {
    /// Summarise fetched records.
    #[must_use]
    pub fn from_records(
        orders: &[Order],
        trucks: usize,
        clients: usize,
        products: usize,
    ) -> Self {
        let mut by_status: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for order in orders {
            *by_status.entry(order.status()).or_default() += 1;
        }

        Self {
            total_orders: orders.len(),
            active_trucks: trucks,
            total_clients: clients,
            total_products: products,
            fuel_delivered: orders.iter().map(|o| o.quantity).sum(),
            by_status,
            recent_activity: orders
                .iter()
                .rev()
                .take(RECENT_ACTIVITY)
                .map(|o| Activity {
                    message: format!(
                        "Order #{} placed for {}",
                        o.sales_order,
                        o.customer_name.as_deref().unwrap_or(&o.customer)
                    ),
                    delivery_date: o.requested_delivery_date.clone(),
                })
                .collect(),
        }
    }

    /// Counts per status, in lifecycle order.
    pub fn status_counts(&self) -> impl Iterator<Item = (OrderStatus, usize)> + '_ {
        self.by_status.iter().map(|(s, n)| (*s, *n))
    }
}

/// Fetch the dashboard counters.
///
/// # Errors
///
/// Returns error if any of the lists cannot be fetched.
#[instrument(skip(api))]
pub async fn dashboard(api: &ApiClient) -> Result<DashboardSummary, AppError> {
    let filter = OrderFilter::default();
    let (orders, trucks, clients, products) = tokio::try_join!(
        api.list_orders(&filter),
        api.list_trucks(),
        api.list_clients(),
        api.list_products(),
    )?;
    Ok(DashboardSummary::from_records(
        &orders,
        trucks.len(),
        clients.len(),
        products.len(),
    ))
}

/// One page of the import history.
///
/// # Errors
///
/// Returns error if the API request fails.
pub async fn import_history(api: &ApiClient, page: Page) -> Result<ImportHistoryPage, AppError> {
    Ok(api.import_history(page).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(sales_order: &str, qty: f64, status: &str) -> Order {
        Order {
            sales_order: sales_order.to_string(),
            customer: "100234".to_string(),
            customer_name: Some("Station Atlas, Fès".to_string()),
            material_code: "200123".to_string(),
            quantity: qty,
            status: Some(status.to_string()),
            requested_delivery_date: Some("2024-05-02".to_string()),
            ..Order::default()
        }
    }

    #[test]
    fn test_csv_has_fixed_headers_and_quotes_commas() {
        let bytes = orders_csv(&[order("4500012", 12000.0, "Completed")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), 23);
        assert!(header.starts_with("Sales Order,Order Type,Customer,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("4500012,,100234,\"Station Atlas, Fès\","));
        assert!(row.contains(",12000.0,") || row.contains(",12000,"));
        assert!(row.ends_with(",Completed"));
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let bytes = orders_xlsx(&[order("4500012", 12000.0, "Completed")]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_file_names() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(daily_report_file_name(start), "orders_report_2024-05-01.csv");
        assert_eq!(
            completed_orders_file_name(start, end),
            "Completed_Orders_2024-05-01_to_2024-05-31.xlsx"
        );
    }

    #[test]
    fn test_dashboard_summary() {
        let orders: Vec<Order> = (1..=7)
            .map(|i| order(&format!("SO{i}"), 1000.5, if i % 2 == 0 { "Completed" } else { "Planning" }))
            .collect();
        let summary = DashboardSummary::from_records(&orders, 4, 12, 9);
        assert_eq!(summary.total_orders, 7);
        assert!((summary.fuel_delivered - 7003.5).abs() < 1e-9);
        assert_eq!(summary.recent_activity.len(), RECENT_ACTIVITY);
        assert_eq!(
            summary.recent_activity[0].message,
            "Order #SO7 placed for Station Atlas, Fès"
        );
        let counts: BTreeMap<OrderStatus, usize> = summary.status_counts().collect();
        assert_eq!(counts[&OrderStatus::Completed], 3);
        assert_eq!(counts[&OrderStatus::Planning], 4);
        assert_eq!(counts[&OrderStatus::Created], 0);
    }
}
