//! REST client for the dispatch backend.
//!
//! One method per resource and verb, grouped by resource in submodules. Every
//! request carries the bearer token from the [`TokenStore`]; a 401 answer
//! clears that token and surfaces as [`ApiError::Unauthorized`] so the caller
//! can send the user back to the login screen.
//!
//! The client never retries. Callers decide how to report failures.
//!
//! # API Reference
//!
//! - Base URL: `FUELOPS_API_URL` (default `http://localhost:3000/api`)
//! - Authentication: `Authorization: Bearer <token>`

mod auth;
mod documents;
mod error;
mod imports;
pub(crate) mod lenient;
mod orders;
mod reference;
mod trips;
mod types;

pub use error::{ApiError, LOGIN_ROUTE};
pub use reference::ReferenceData;
pub use types::*;

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::session::TokenStore;

/// Backend API client.
///
/// Cheap to clone; clones share the HTTP connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fuelops/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                tokens,
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The token store this client authenticates with.
    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.inner.tokens.as_ref()
    }

    /// Resolve an endpoint path (with or without leading `/`) against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Attach the bearer token, when logged in.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.tokens.get_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.url(path)?);
        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Execute a GET request with query parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned, Q: Serialize + Sync>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.url(path)?).query(query);
        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.url(path)?).json(body);
        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.put(self.url(path)?).json(body);
        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Execute a DELETE request, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.inner.client.delete(self.url(path)?);
        let response = self.authorize(request).send().await?;
        self.check_status(response).await.map(drop)
    }

    /// Execute a POST request with a JSON body, ignoring any response body.
    pub(crate) async fn post_no_content<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.inner.client.post(self.url(path)?).json(body);
        let response = self.authorize(request).send().await?;
        self.check_status(response).await.map(drop)
    }

    /// Execute a bodiless POST request returning raw bytes (generated files).
    pub(crate) async fn post_for_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let request = self.inner.client.post(self.url(path)?);
        let response = self.authorize(request).send().await?;
        let response = self.check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Execute a multipart POST request.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.url(path)?).multipart(form);
        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let response = self.check_status(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
    }

    /// Pass successful responses through, turning failures into errors.
    async fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "Backend request succeeded");
            return Ok(response);
        }
        Err(self.parse_error(response).await)
    }

    /// Parse an error response.
    async fn parse_error(&self, response: Response) -> ApiError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Backend rejected session, clearing stored token");
            if let Err(e) = self.inner.tokens.clear_token() {
                return ApiError::Session(e);
            }
            return ApiError::Unauthorized {
                redirect: LOGIN_ROUTE,
            };
        }

        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound(response.url().path().to_string());
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ApiError::Api {
            status: status.as_u16(),
            message: extract_message(&text),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Pull a human-readable message out of an error body.
///
/// Backends answer with `{"message": ...}` or `{"error": ...}`; anything else
/// is returned verbatim.
fn extract_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(alias = "error")]
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
