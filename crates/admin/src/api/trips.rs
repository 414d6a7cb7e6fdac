//! Trip endpoints.

use fuelops_core::TripId;
use tracing::{debug, instrument};

use super::{
    ApiClient, ApiError, ConfirmLoadingRequest, ConfirmLoadingResponse, CreateTripRequest, Page,
    Trip, TripLoadingUpdate, TripPage,
};

impl ApiClient {
    /// List one page of trips.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_trips(&self, page: Page) -> Result<TripPage, ApiError> {
        let trips: TripPage = self.get_with_query("/trips", &page).await?;
        debug!(count = trips.trips.len(), total = trips.total_count, "Trips fetched");
        Ok(trips)
    }

    /// Get a trip with its order lines.
    ///
    /// # Errors
    ///
    /// Returns error if the trip is not found or the API request fails.
    #[instrument(skip(self), fields(trip_id = %id))]
    pub async fn get_trip(&self, id: TripId) -> Result<Trip, ApiError> {
        self.get(&format!("/trips/{id}")).await
    }

    /// Create a trip from planned order lines.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(vehicle = %request.vehicle_id, orders = request.order_ids.len()))]
    pub async fn create_trip(&self, request: &CreateTripRequest) -> Result<Trip, ApiError> {
        self.post("/trips", request).await
    }

    /// Replace a trip record.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, trip), fields(trip_id = %id))]
    pub async fn update_trip(&self, id: TripId, trip: &Trip) -> Result<Trip, ApiError> {
        self.put(&format!("/trips/{id}"), trip).await
    }

    /// Delete a trip.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(trip_id = %id))]
    pub async fn delete_trip(&self, id: TripId) -> Result<(), ApiError> {
        self.delete(&format!("/trips/{id}")).await
    }

    /// Record loading status and seal numbers.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, update), fields(trip_id = %id, seals = update.seal_numbers.len()))]
    pub async fn update_trip_loading(&self, id: TripId, update: &TripLoadingUpdate) -> Result<Trip, ApiError> {
        self.put(&format!("/trips/{id}/loading"), update).await
    }

    /// Confirm loading with per-compartment seal numbers.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(trip_id = %id))]
    pub async fn confirm_loading(
        &self,
        id: TripId,
        request: &ConfirmLoadingRequest,
    ) -> Result<ConfirmLoadingResponse, ApiError> {
        self.post(&format!("/trips/{id}/confirm-loading"), request).await
    }
}
