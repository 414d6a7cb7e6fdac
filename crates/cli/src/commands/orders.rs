//! Sales order commands.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fuelops_admin::AppContext;
use fuelops_admin::aggregation::{OrderGroup, group_by_sales_order, group_by_trip};
use fuelops_admin::api::{Order, OrderFilter};
use fuelops_admin::orders::{create_order_lines, next_sales_order, update_status};
use fuelops_core::{OrderId, OrderRegime, OrderStatus};
use serde_json::Value;

use crate::Grouping;
use crate::error::CliError;
use crate::output;

/// Item numbers step by ten, SAP style.
const ITEM_STEP: usize = 10;

/// Parse a `MATERIAL=QUANTITY` order line; a decimal comma is accepted.
///
/// # Errors
///
/// Returns a message when the line is malformed or the quantity is not a
/// positive number.
pub fn parse_line(value: &str) -> Result<(String, f64), String> {
    let (material, qty) = value
        .split_once('=')
        .ok_or_else(|| format!("expected MATERIAL=QUANTITY, got `{value}`"))?;
    let material = material.trim();
    if material.is_empty() {
        return Err(format!("missing material code in `{value}`"));
    }
    let qty: f64 = qty
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid quantity in `{value}`"))?;
    if qty <= 0.0 {
        return Err(format!("quantity must be positive in `{value}`"));
    }
    Ok((material.to_string(), qty))
}

fn line_row(order: &Order) -> Vec<String> {
    vec![
        order.id.map(|id| id.to_string()).unwrap_or_default(),
        order.sales_order.clone(),
        output::or_dash(order.item.as_deref()),
        order.customer_name.clone().unwrap_or_else(|| order.customer.clone()),
        order.material_code.clone(),
        output::quantity(order.quantity),
        output::or_dash(order.requested_delivery_date.as_deref()),
        order.status().to_string(),
        output::or_dash(order.trip_num.as_deref()),
    ]
}

fn group_row(group: &OrderGroup) -> Vec<String> {
    vec![
        group.key.clone(),
        group.customer_name().unwrap_or(group.customer()).to_string(),
        group.plant().to_string(),
        group.regime().map(|r| r.to_string()).unwrap_or_default(),
        group.lines.len().to_string(),
        output::quantity(group.total_quantity),
        group.status().to_string(),
    ]
}

pub async fn list(ctx: &AppContext, filter: &OrderFilter, grouping: Grouping) -> Result<(), CliError> {
    let orders = ctx.api().list_orders(filter).await?;
    if orders.is_empty() {
        output::line("No orders found.");
        return Ok(());
    }

    let count = orders.len();
    match grouping {
        Grouping::None => {
            let rows: Vec<Vec<String>> = orders.iter().map(line_row).collect();
            output::table(
                &["ID", "Sales Order", "Item", "Customer", "Material", "Qty", "Delivery", "Status", "Trip"],
                &rows,
            );
        }
        Grouping::SalesOrder | Grouping::Trip => {
            let (title, groups) = if matches!(grouping, Grouping::Trip) {
                ("Trip", group_by_trip(orders))
            } else {
                ("Sales Order", group_by_sales_order(orders))
            };
            let rows: Vec<Vec<String>> = groups.iter().map(group_row).collect();
            output::table(
                &[title, "Customer", "Plant", "Regime", "Lines", "Qty", "Status"],
                &rows,
            );
        }
    }
    output::line(format!("{count} order lines"));
    Ok(())
}

/// Header fields shared by every line of a new sales order.
pub struct NewOrder {
    pub sales_order: Option<String>,
    pub customer: String,
    pub ship_to: Option<String>,
    pub plant: String,
    pub date: NaiveDate,
    pub regime: OrderRegime,
    pub order_type: Option<String>,
}

fn build_lines(header: &NewOrder, sales_order: &str, lines: &[(String, f64)]) -> Vec<Order> {
    let ship_to = header.ship_to.clone().unwrap_or_else(|| header.customer.clone());
    lines
        .iter()
        .enumerate()
        .map(|(index, (material, quantity))| Order {
            sales_order: sales_order.to_string(),
            item: Some(((index + 1) * ITEM_STEP).to_string()),
            order_type: header.order_type.clone(),
            customer: header.customer.clone(),
            ship_to_party: Some(ship_to.clone()),
            plant: header.plant.clone(),
            material_code: material.clone(),
            quantity: *quantity,
            requested_delivery_date: Some(header.date.format("%Y-%m-%d").to_string()),
            status: Some(OrderStatus::Created.as_str().to_string()),
            regime: Some(header.regime),
            ..Order::default()
        })
        .collect()
}

pub async fn create(ctx: &AppContext, header: NewOrder, lines: &[(String, f64)]) -> Result<(), CliError> {
    let sales_order = match header.sales_order.clone() {
        Some(number) => number,
        None => next_sales_order(ctx.api().latest_sales_order().await?.as_deref()),
    };

    let orders = build_lines(&header, &sales_order, lines);
    let response = create_order_lines(ctx.api(), &orders).await?;

    output::line(format!(
        "Sales order {sales_order}: {} of {} lines created",
        response.created.len(),
        orders.len()
    ));
    for failure in &response.errors {
        match failure.row {
            Some(row) => output::line(format!("  Line {row}: {}", failure.error)),
            None => output::line(format!("  {}", failure.error)),
        }
    }
    Ok(())
}

pub async fn set_status(ctx: &AppContext, ids: &[OrderId], status: OrderStatus) -> Result<(), CliError> {
    if let [id] = ids {
        let order = update_status(ctx.api(), *id, status).await?;
        output::line(format!(
            "Order line {id} ({}) is now {}",
            order.sales_order,
            order.status()
        ));
        return Ok(());
    }

    let updates = BTreeMap::from([(
        "Status".to_string(),
        Value::String(status.as_str().to_string()),
    )]);
    let updated = ctx.api().bulk_update_orders(ids, &updates).await?;
    output::line(format!("{} order lines set to {status}", updated.len()));
    Ok(())
}

pub async fn delete(ctx: &AppContext, ids: &[OrderId]) -> Result<(), CliError> {
    if let [id] = ids {
        ctx.api().delete_order(*id).await?;
    } else {
        ctx.api().delete_orders(ids).await?;
    }
    output::line(format!("{} order lines deleted", ids.len()));
    Ok(())
}

pub async fn next(ctx: &AppContext) -> Result<(), CliError> {
    let latest = ctx.api().latest_sales_order().await?;
    output::line(next_sales_order(latest.as_deref()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("200123=12000").unwrap(), ("200123".to_string(), 12000.0));
        assert_eq!(parse_line(" 200124 = 3000,5 ").unwrap(), ("200124".to_string(), 3000.5));
        assert!(parse_line("200123").is_err());
        assert!(parse_line("=100").is_err());
        assert!(parse_line("200123=abc").is_err());
        assert!(parse_line("200123=0").is_err());
    }

    #[test]
    fn test_build_lines_numbers_items_and_defaults_ship_to() {
        let header = NewOrder {
            sales_order: None,
            customer: "100234".to_string(),
            ship_to: None,
            plant: "1020".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            regime: OrderRegime::Vrac,
            order_type: None,
        };
        let lines = build_lines(
            &header,
            "4500013",
            &[("200123".to_string(), 12000.0), ("200124".to_string(), 3000.0)],
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].item.as_deref(), Some("10"));
        assert_eq!(lines[1].item.as_deref(), Some("20"));
        assert_eq!(lines[1].ship_to_party.as_deref(), Some("100234"));
        assert_eq!(lines[0].requested_delivery_date.as_deref(), Some("2024-05-02"));
        assert_eq!(lines[0].status(), OrderStatus::Created);
    }
}
