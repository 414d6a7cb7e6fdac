//! Order endpoints.

use std::collections::BTreeMap;

use fuelops_core::OrderId;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{
    ApiClient, ApiError, BulkUpdate, CreateMultipleResponse, LatestSalesOrder, Order, OrderFilter,
    OrderIds, OrderImportResponse,
};

impl ApiClient {
    /// List order lines matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError> {
        let orders: Vec<Order> = self.get_with_query("/orders", filter).await?;
        debug!(count = orders.len(), "Orders fetched");
        Ok(orders)
    }

    /// Get a single order line.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{id}")).await
    }

    /// Create one order line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, order), fields(sales_order = %order.sales_order))]
    pub async fn create_order(&self, order: &Order) -> Result<Order, ApiError> {
        self.post("/orders", order).await
    }

    /// Replace an order line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, order), fields(order_id = %id))]
    pub async fn update_order(&self, id: OrderId, order: &Order) -> Result<Order, ApiError> {
        self.put(&format!("/orders/{id}"), order).await
    }

    /// Delete an order line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.delete(&format!("/orders/{id}")).await
    }

    /// Create several order lines in one request; the backend reports
    /// per-line outcomes.
    ///
    /// # Errors
    ///
    /// Returns error if the request as a whole fails.
    #[instrument(skip(self, orders), fields(count = orders.len()))]
    pub async fn create_multiple_orders(&self, orders: &[Order]) -> Result<CreateMultipleResponse, ApiError> {
        self.post("/orders/create-multiple", &orders).await
    }

    /// Submit one batch of imported order lines.
    ///
    /// # Errors
    ///
    /// Returns error if the request as a whole fails.
    #[instrument(skip(self, orders), fields(count = orders.len()))]
    pub async fn import_orders(&self, orders: &[Order]) -> Result<OrderImportResponse, ApiError> {
        self.post("/orders/import", &orders).await
    }

    /// Delete several order lines.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_orders(&self, ids: &[OrderId]) -> Result<(), ApiError> {
        self.post_no_content("/orders/delete-multiple", &OrderIds { order_ids: ids })
            .await
    }

    /// Apply the same field updates to several order lines.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, ids, updates), fields(count = ids.len()))]
    pub async fn bulk_update_orders(
        &self,
        ids: &[OrderId],
        updates: &BTreeMap<String, Value>,
    ) -> Result<Vec<Order>, ApiError> {
        self.put(
            "/orders/bulk-update",
            &BulkUpdate {
                order_ids: ids,
                updates,
            },
        )
        .await
    }

    /// Highest sales order number issued so far.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn latest_sales_order(&self) -> Result<Option<String>, ApiError> {
        let response: LatestSalesOrder = self.get("/orders/latest-sales-order").await?;
        Ok(response.latest_sales_order)
    }
}
