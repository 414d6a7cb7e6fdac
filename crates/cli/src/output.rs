//! Terminal output for command results.
//!
//! Results go to stdout; diagnostics go through `tracing` on stderr.

#![allow(clippy::print_stdout)]

use std::fmt::Display;

use fuelops_admin::api::BackendRowError;
use fuelops_admin::import::{ImportReport, RowError};

pub fn line(text: impl Display) {
    println!("{text}");
}

/// `label: value`, indented under a heading.
pub fn field(label: &str, value: impl Display) {
    println!("  {label:<18} {value}");
}

pub fn heading(text: impl Display) {
    println!();
    println!("{text}");
}

/// Left-aligned columns separated by two spaces.
pub fn table<R: AsRef<[String]>>(headers: &[&str], rows: &[R]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.as_ref()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", format_row(headers.iter().copied(), &widths));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!(
            "{}",
            format_row(row.as_ref().iter().map(String::as_str), &widths)
        );
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Quantity without a fractional part when it is whole.
#[must_use]
pub fn quantity(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[must_use]
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

pub fn row_errors(errors: &[RowError]) {
    for error in errors {
        println!("  {error}");
    }
}

fn backend_errors(title: &str, errors: &[BackendRowError]) {
    if errors.is_empty() {
        return;
    }
    heading(format!("{title} ({})", errors.len()));
    for error in errors {
        match error.row {
            Some(row) => println!("  Row {row}: {}", error.error),
            None => println!("  {}", error.error),
        }
    }
}

pub fn import_report(report: &ImportReport) {
    line(report.summary());
    field(
        "Rows submitted",
        format!(
            "{} of {} ({}%)",
            report.rows_submitted,
            report.total_rows,
            report.progress_percent()
        ),
    );
    field("Batches", report.batches_sent);
    field("Records imported", report.records_imported);
    backend_errors("Errors", &report.errors);
    backend_errors("Price warnings", &report.warnings);
}
