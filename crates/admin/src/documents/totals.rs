//! Document arithmetic: customer grouping, invoice totals, product totals.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use fuelops_core::VatRate;
use rust_decimal::Decimal;

use crate::api::{Order, Product};

/// Payment delay printed on invoices.
pub const PAYMENT_DELAY_MONTHS: u32 = 3;

/// Lines of one trip billed to the same sold-to customer.
#[derive(Debug, Clone)]
pub struct CustomerGroup<'a> {
    pub sold_to: &'a str,
    pub lines: Vec<&'a Order>,
}

impl<'a> CustomerGroup<'a> {
    #[must_use]
    pub fn first(&self) -> Option<&'a Order> {
        self.lines.first().copied()
    }

    /// Plain float sum of line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> f64 {
        self.lines.iter().map(|o| o.quantity).sum()
    }
}

/// Group lines by sold-to customer, in order of first appearance.
#[must_use]
pub fn group_by_customer(orders: &[Order]) -> Vec<CustomerGroup<'_>> {
    let mut groups: Vec<CustomerGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for order in orders {
        let sold_to = order.sold_to();
        let slot = *index.entry(sold_to).or_insert_with(|| {
            groups.push(CustomerGroup {
                sold_to,
                lines: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(slot) {
            group.lines.push(order);
        }
    }
    groups
}

/// Net, VAT and gross amounts of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub net: Decimal,
    pub vat_rate: VatRate,
    pub vat: Decimal,
    pub gross: Decimal,
}

impl InvoiceTotals {
    /// Totals of a group of lines.
    ///
    /// The VAT rate is the first line's product rate and applies to the
    /// whole invoice. Lines without a price count as zero.
    #[must_use]
    pub fn compute(lines: &[&Order]) -> Self {
        let net: Decimal = lines
            .iter()
            .map(|o| o.total_price.unwrap_or_default())
            .sum();
        let vat_rate = lines
            .first()
            .and_then(|o| o.product.as_ref())
            .map_or(VatRate::ZERO, Product::vat_rate);
        let vat = vat_rate.apply(net);
        Self {
            net,
            vat_rate,
            vat,
            gross: net + vat,
        }
    }
}

/// Unit price of a line: its net amount over its quantity.
#[must_use]
pub fn unit_price(order: &Order) -> Option<Decimal> {
    let quantity = Decimal::try_from(order.quantity).ok()?;
    order.total_price?.checked_div(quantity)
}

/// Invoice due date.
#[must_use]
pub fn due_date(issued: NaiveDate) -> NaiveDate {
    issued
        .checked_add_months(Months::new(PAYMENT_DELAY_MONTHS))
        .unwrap_or(issued)
}

/// Quantity to load for one product across a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    pub material: String,
    pub description: Option<String>,
    pub valuation_type: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
}

/// Sum quantities per product, in order of first appearance.
#[must_use]
pub fn product_totals(orders: &[Order]) -> Vec<ProductTotal> {
    let mut totals: Vec<ProductTotal> = Vec::new();
    for order in orders {
        let material = order
            .product
            .as_ref()
            .map(|p| p.material.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(&order.material_code);
        if let Some(total) = totals.iter_mut().find(|t| t.material == material) {
            total.quantity += order.quantity;
            continue;
        }
        totals.push(ProductTotal {
            material: material.to_string(),
            description: order
                .product
                .as_ref()
                .and_then(|p| p.description.clone())
                .or_else(|| order.material_name.clone()),
            valuation_type: order.valuation_type.clone(),
            quantity: order.quantity,
            unit: order.unit_of_measure().map(str::to_string),
        });
    }
    totals
}
