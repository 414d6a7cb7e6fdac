//! Parent/child view of flat order lines.
//!
//! The backend returns one record per order line. Tables show them grouped
//! under their sales order (or trip) with a total quantity. Groups are
//! derived on every fetch and never stored.

use std::collections::{HashMap, HashSet};

use fuelops_core::{OrderRegime, OrderStatus};

use crate::api::Order;

/// Order lines sharing one key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderGroup {
    /// Sales order or trip number.
    pub key: String,
    /// Lines in first-seen order, one per item number.
    pub lines: Vec<Order>,
    /// Plain float sum of line quantities.
    pub total_quantity: f64,
}

impl OrderGroup {
    fn new(key: String) -> Self {
        Self {
            key,
            lines: Vec::new(),
            total_quantity: 0.0,
        }
    }

    fn push(&mut self, line: Order) {
        self.total_quantity += line.quantity;
        self.lines.push(line);
    }

    fn first(&self) -> Option<&Order> {
        self.lines.first()
    }

    #[must_use]
    pub fn customer(&self) -> &str {
        self.first().map_or("", |o| o.customer.as_str())
    }

    #[must_use]
    pub fn customer_name(&self) -> Option<&str> {
        self.first().and_then(|o| o.customer_name.as_deref())
    }

    #[must_use]
    pub fn plant(&self) -> &str {
        self.first().map_or("", |o| o.plant.as_str())
    }

    #[must_use]
    pub fn regime(&self) -> Option<OrderRegime> {
        self.lines.iter().find_map(|o| o.regime)
    }

    /// Status of the group: its least advanced line.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.lines
            .iter()
            .map(Order::status)
            .min()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn order_ids(&self) -> Vec<fuelops_core::OrderId> {
        self.lines.iter().filter_map(|o| o.id).collect()
    }
}

/// Group lines by a key, keeping first-appearance order of groups and
/// dropping repeated item numbers within a group (first wins).
///
/// Lines for which `key` returns `None` are left out.
pub fn group_by<F>(orders: impl IntoIterator<Item = Order>, mut key: F) -> Vec<OrderGroup>
where
    F: FnMut(&Order) -> Option<String>,
{
    let mut groups: Vec<(OrderGroup, HashSet<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for order in orders {
        let Some(k) = key(&order) else {
            continue;
        };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((OrderGroup::new(k), HashSet::new()));
            groups.len() - 1
        });
        let Some((group, seen_items)) = groups.get_mut(slot) else {
            continue;
        };
        if let Some(item) = &order.item
            && !seen_items.insert(item.clone())
        {
            continue;
        }
        group.push(order);
    }
    groups.into_iter().map(|(group, _)| group).collect()
}

/// Group lines under their sales order number.
pub fn group_by_sales_order(orders: impl IntoIterator<Item = Order>) -> Vec<OrderGroup> {
    group_by(orders, |o| Some(o.sales_order.clone()))
}

/// Group assigned lines under their trip number; unassigned lines are skipped.
pub fn group_by_trip(orders: impl IntoIterator<Item = Order>) -> Vec<OrderGroup> {
    group_by(orders, |o| o.trip_num.clone().filter(|t| !t.is_empty()))
}

/// Total quantity over several groups.
#[must_use]
pub fn total_quantity(groups: &[&OrderGroup]) -> f64 {
    groups.iter().map(|g| g.total_quantity).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(sales_order: &str, item: &str, qty: f64) -> Order {
        Order {
            sales_order: sales_order.to_string(),
            item: Some(item.to_string()),
            quantity: qty,
            ..Order::default()
        }
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let groups = group_by_sales_order(vec![
            line("B", "10", 1.0),
            line("A", "10", 2.0),
            line("B", "20", 3.0),
        ]);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(groups[0].lines.len(), 2);
    }

    #[test]
    fn test_total_is_float_sum_of_distinct_items() {
        let groups = group_by_sales_order(vec![
            line("S", "10", 0.1),
            line("S", "20", 0.2),
            line("S", "10", 99.0),
            line("S", "30", 0.3),
        ]);
        let group = &groups[0];
        assert_eq!(group.lines.len(), 3);
        let expected: f64 = group.lines.iter().map(|l| l.quantity).sum();
        assert!((group.total_quantity - expected).abs() < f64::EPSILON);
        assert!((group.lines[0].quantity - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lines_without_item_are_all_kept() {
        let mut a = line("S", "", 1.0);
        a.item = None;
        let b = a.clone();
        let groups = group_by_sales_order(vec![a, b]);
        assert_eq!(groups[0].lines.len(), 2);
    }

    #[test]
    fn test_group_by_trip_skips_unassigned() {
        let mut assigned = line("S1", "10", 5.0);
        assigned.trip_num = Some("55".to_string());
        let unassigned = line("S2", "10", 7.0);
        let groups = group_by_trip(vec![assigned, unassigned]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "55");
    }

    #[test]
    fn test_group_status_is_least_advanced() {
        let mut a = line("S", "10", 1.0);
        a.status = Some("Loading".to_string());
        let mut b = line("S", "20", 1.0);
        b.status = Some("Planning".to_string());
        let groups = group_by_sales_order(vec![a, b]);
        assert_eq!(groups[0].status(), OrderStatus::Planning);
    }
}
