//! Report and dashboard commands.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use fuelops_admin::AppContext;
use fuelops_admin::reports::{dashboard as fetch_dashboard, export_completed_orders, export_daily_orders};

use crate::error::CliError;
use crate::output;

fn output_dir(ctx: &AppContext, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| ctx.config().documents.output_dir.clone())
}

pub async fn daily(ctx: &AppContext, date: Option<NaiveDate>, dir: Option<PathBuf>) -> Result<(), CliError> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let (path, rows) = export_daily_orders(ctx.api(), date, &output_dir(ctx, dir)).await?;
    output::line(format!("{rows} orders written to {}", path.display()));
    Ok(())
}

pub async fn completed(
    ctx: &AppContext,
    start: NaiveDate,
    end: NaiveDate,
    dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let (path, rows) = export_completed_orders(ctx.api(), start, end, &output_dir(ctx, dir)).await?;
    output::line(format!("{rows} completed orders written to {}", path.display()));
    Ok(())
}

pub async fn dashboard(ctx: &AppContext) -> Result<(), CliError> {
    let summary = fetch_dashboard(ctx.api()).await?;

    output::field("Orders", summary.total_orders);
    output::field("Trucks", summary.active_trucks);
    output::field("Clients", summary.total_clients);
    output::field("Products", summary.total_products);
    output::field("Fuel ordered", format!("{} L", output::quantity(summary.fuel_delivered)));

    output::heading("Orders by status");
    for (status, count) in summary.status_counts() {
        output::field(status.as_str(), count);
    }

    if !summary.recent_activity.is_empty() {
        output::heading("Recent activity");
        for activity in &summary.recent_activity {
            match &activity.delivery_date {
                Some(date) => output::line(format!("  {}  (delivery {date})", activity.message)),
                None => output::line(format!("  {}", activity.message)),
            }
        }
    }
    Ok(())
}
