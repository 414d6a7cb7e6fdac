//! Order entry rules and helpers.

use std::collections::BTreeMap;
use std::fmt;

use fuelops_core::{OrderId, OrderStatus};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError, CreateMultipleResponse, Order};
use crate::error::AppError;

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check the required fields and quantity of one order line.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_order(order: &Order) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let required = [
        ("Sales Order", order.sales_order.as_str()),
        ("Customer", order.customer.as_str()),
        ("Plant", order.plant.as_str()),
        ("Material Code", order.material_code.as_str()),
        (
            "Requested delivery date",
            order.requested_delivery_date.as_deref().unwrap_or_default(),
        ),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{field} is required.")));
        }
    }
    if !(order.quantity.is_finite() && order.quantity > 0.0) {
        errors.push(FieldError::new(
            "Order Qty",
            "Order quantity must be a positive number.",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check that lines of the same sales order agree on customer, depot and
/// regime.
#[must_use]
pub fn check_line_consistency(lines: &[Order]) -> Vec<FieldError> {
    let mut by_order: BTreeMap<&str, Vec<&Order>> = BTreeMap::new();
    for line in lines {
        by_order.entry(line.sales_order.as_str()).or_default().push(line);
    }

    let mut errors = Vec::new();
    for (sales_order, group) in by_order {
        let Some(first) = group.first().copied() else {
            continue;
        };
        if group.iter().any(|l| l.customer != first.customer) {
            errors.push(FieldError::new(
                "Customer",
                format!("Sales Order {sales_order}: all lines must share the same customer."),
            ));
        }
        if group.iter().any(|l| l.plant != first.plant) {
            errors.push(FieldError::new(
                "Plant",
                format!("Sales Order {sales_order}: all lines must share the same plant."),
            ));
        }
        let mut regimes = group.iter().filter_map(|l| l.regime);
        if let Some(regime) = regimes.next()
            && regimes.any(|r| r != regime)
        {
            errors.push(FieldError::new(
                "order_type",
                "VRAC and PACK product types cannot be mixed in a single order.",
            ));
        }
    }
    errors
}

/// Sales order number following `latest`.
///
/// The trailing digits are incremented and their width kept
/// (`SO0099` becomes `SO0100`). Without a previous number the sequence
/// starts at `1`.
#[must_use]
pub fn next_sales_order(latest: Option<&str>) -> String {
    let Some(latest) = latest.map(str::trim).filter(|s| !s.is_empty()) else {
        return "1".to_string();
    };

    let split = latest
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(latest.len(), |(i, _)| i);
    let (prefix, digits) = latest.split_at(split);
    if digits.is_empty() {
        return format!("{prefix}1");
    }

    // Increment the decimal string directly so arbitrarily long numbers work.
    let mut bytes = digits.as_bytes().to_vec();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if !carry {
            break;
        }
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            carry = false;
        }
    }
    let mut next = String::with_capacity(latest.len() + 1);
    next.push_str(prefix);
    if carry {
        next.push('1');
    }
    next.extend(bytes.into_iter().map(char::from));
    next
}

/// Validate and create several order lines in one request.
///
/// # Errors
///
/// Returns [`AppError::Validation`] before any request when a line is
/// invalid, or the backend error when the request fails as a whole.
#[instrument(skip(api, lines), fields(count = lines.len()))]
pub async fn create_order_lines(
    api: &ApiClient,
    lines: &[Order],
) -> Result<CreateMultipleResponse, AppError> {
    let mut errors = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if let Err(line_errors) = validate_order(line) {
            errors.extend(line_errors.into_iter().map(|e| FieldError {
                message: format!("Line {}: {}", index + 1, e.message),
                ..e
            }));
        }
    }
    errors.extend(check_line_consistency(lines));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let response = api.create_multiple_orders(lines).await?;
    for failure in &response.errors {
        warn!(row = ?failure.row, error = %failure.error, "Order line rejected");
    }
    debug!(
        created = response.created.len(),
        failed = response.errors.len(),
        "Order lines submitted"
    );
    Ok(response)
}

/// Set the status of an order line (fetch, change, store).
///
/// # Errors
///
/// Returns error if the line cannot be fetched or stored.
#[instrument(skip(api), fields(order_id = %id, status = %status))]
pub async fn update_status(
    api: &ApiClient,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, ApiError> {
    let mut order = api.get_order(id).await?;
    order.status = Some(status.as_str().to_string());
    api.update_order(id, &order).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fuelops_core::OrderRegime;

    use super::*;

    fn line(sales_order: &str) -> Order {
        Order {
            sales_order: sales_order.to_string(),
            customer: "100234".to_string(),
            plant: "1020".to_string(),
            material_code: "200123".to_string(),
            quantity: 12000.0,
            requested_delivery_date: Some("2024-05-02".to_string()),
            regime: Some(OrderRegime::Vrac),
            ..Order::default()
        }
    }

    #[test]
    fn test_valid_line() {
        assert!(validate_order(&line("4500012")).is_ok());
    }

    #[test]
    fn test_required_fields_and_quantity() {
        let order = Order {
            quantity: -5.0,
            ..Order::default()
        };
        let errors = validate_order(&order).unwrap_err();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Sales Order is required.",
                "Customer is required.",
                "Plant is required.",
                "Material Code is required.",
                "Requested delivery date is required.",
                "Order quantity must be a positive number.",
            ]
        );
    }

    #[test]
    fn test_mixed_regimes_rejected() {
        let mut pack = line("4500012");
        pack.regime = Some(OrderRegime::Pack);
        let errors = check_line_consistency(&[line("4500012"), pack, line("4500013")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "VRAC and PACK product types cannot be mixed in a single order."
        );
    }

    #[test]
    fn test_lines_must_share_customer_and_plant() {
        let mut other = line("4500012");
        other.customer = "100999".to_string();
        other.plant = "1030".to_string();
        let errors = check_line_consistency(&[line("4500012"), other]);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Customer", "Plant"]);
    }

    #[test]
    fn test_next_sales_order() {
        assert_eq!(next_sales_order(Some("4500012")), "4500013");
        assert_eq!(next_sales_order(Some("SO0099")), "SO0100");
        assert_eq!(next_sales_order(Some("999")), "1000");
        assert_eq!(next_sales_order(Some("SO")), "SO1");
        assert_eq!(next_sales_order(None), "1");
        assert_eq!(next_sales_order(Some("  ")), "1");
    }
}
