//! Reference (master) data endpoints.

use fuelops_core::{ProductId, TruckId};
use tracing::{debug, instrument};

use super::{ApiClient, ApiError, Client, Plant, PriceEntry, Product, Tank, Truck};

/// Reference lists fetched together when a page opens.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub plants: Vec<Plant>,
    pub trucks: Vec<Truck>,
}

impl ApiClient {
    /// List all clients.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<Client>, ApiError> {
        self.get("/data/clients").await
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/data/products").await
    }

    /// List all depots.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_plants(&self) -> Result<Vec<Plant>, ApiError> {
        self.get("/data/plants").await
    }

    /// List all trucks.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_trucks(&self) -> Result<Vec<Truck>, ApiError> {
        self.get("/data/trucks").await
    }

    /// List all price entries.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_prices(&self) -> Result<Vec<PriceEntry>, ApiError> {
        self.get("/data/prices").await
    }

    /// List all depot tanks.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_tanks(&self) -> Result<Vec<Tank>, ApiError> {
        self.get("/data/tanks").await
    }

    /// Fetch clients, products, depots and trucks concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error among the four requests.
    #[instrument(skip(self))]
    pub async fn fetch_reference_data(&self) -> Result<ReferenceData, ApiError> {
        let (clients, products, plants, trucks) = tokio::try_join!(
            self.list_clients(),
            self.list_products(),
            self.list_plants(),
            self.list_trucks(),
        )?;

        debug!(
            clients = clients.len(),
            products = products.len(),
            plants = plants.len(),
            trucks = trucks.len(),
            "Reference data loaded"
        );

        Ok(ReferenceData {
            clients,
            products,
            plants,
            trucks,
        })
    }

    /// Update a product record (pass-through).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, product: &Product) -> Result<Product, ApiError> {
        self.put(&format!("/products/{id}"), product).await
    }

    /// Update a truck record (pass-through).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, truck), fields(truck_id = %id))]
    pub async fn update_truck(&self, id: TruckId, truck: &Truck) -> Result<Truck, ApiError> {
        self.put(&format!("/trucks/{id}"), truck).await
    }
}
