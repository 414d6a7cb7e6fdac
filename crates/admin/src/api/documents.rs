//! Server-rendered document endpoints.

use fuelops_core::OrderId;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Delivery note PDF rendered by the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delivery_note_pdf(&self, order_id: OrderId) -> Result<Vec<u8>, ApiError> {
        self.post_for_bytes(&format!("/documents/delivery-note/{order_id}"))
            .await
    }

    /// Invoice PDF rendered by the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn invoice_pdf(&self, order_id: OrderId) -> Result<Vec<u8>, ApiError> {
        self.post_for_bytes(&format!("/documents/invoice/{order_id}")).await
    }
}
