//! Integration tests for fuelops.
//!
//! The tests drive the real [`ApiClient`] and pipelines against
//! [`MockBackend`], an axum server bound to an ephemeral port on
//! `127.0.0.1`. The mock answers canned responses per route and records
//! every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fuelops-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! backend.on("GET", "/api/data/clients", MockResponse::json(json!([])));
//! let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
//! api.list_clients().await?;
//! assert_eq!(backend.requests_to("GET", "/api/data/clients").len(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use fuelops_admin::api::{ApiClient, ReferenceData};
use fuelops_admin::config::ApiConfig;
use fuelops_admin::lookup::LookupCache;
use fuelops_admin::session::TokenStore;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// A canned answer.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl MockResponse {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::status(StatusCode::OK, value)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn status(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    /// `200 OK` with a PDF body.
    #[must_use]
    pub fn pdf(bytes: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/pdf",
            body: bytes.to_vec(),
        }
    }
}

/// A request as received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Body parsed as JSON; `Null` when it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body as text, for multipart uploads.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

type RouteKey = (String, String);

#[derive(Default)]
struct MockState {
    /// Queued answers per route; the last one keeps being served.
    routes: Mutex<HashMap<RouteKey, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-process stand-in for the dispatch backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Queue a response for `method path` (path includes `/api`).
    pub fn on(&self, method: &str, path: &str, response: MockResponse) {
        lock(&self.state.routes)
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Serve every `/data/*` reference list from one fixture object.
    pub fn serve_reference_data(&self, data: &Value) {
        for kind in ["clients", "products", "plants", "trucks", "prices", "tanks"] {
            let list = data.get(kind).cloned().unwrap_or_else(|| json!([]));
            self.on("GET", &format!("/api/data/{kind}"), MockResponse::json(list));
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this mock.
    ///
    /// # Panics
    ///
    /// Panics if the mock URL does not parse.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url()).expect("mock base URL")
    }

    /// API client authenticating through `tokens`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self, tokens: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::new(&self.api_config(), tokens).expect("API client")
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests received for one route.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    lock(&state.requests).push(RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let key = (method.as_str().to_string(), uri.path().to_string());
    let response = {
        let mut routes = lock(&state.routes);
        routes.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    match response {
        Some(r) => (r.status, [(header::CONTENT_TYPE, r.content_type)], r.body).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({ "message": format!("no route for {} {}", key.0, key.1) }).to_string(),
        )
            .into_response(),
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Reference data for a small depot: one client, two products, two depots
/// and two trucks (30 000 L bulk, 12 000 L packed).
#[must_use]
pub fn reference_fixture() -> Value {
    json!({
        "clients": [{
            "id": 1,
            "Customer Sold to": "100234",
            "Customer Sold to name": "Station Atlas",
            "Customer Ship to": "100234",
            "Customer ship to name": "Station Atlas Fès",
            "Customer ship to Address": "Route de Sefrou",
            "Customer ship to city": "Fès"
        }],
        "products": [
            {
                "id": 1,
                "Material": "200123",
                "Material description": "Gasoil 10ppm",
                "Base Unit of Measure": "L",
                "Tax": "0.10",
                "density": 0.835,
                "temp": 15
            },
            {
                "id": 2,
                "Material": "300500",
                "Material description": "Lubrifiant 5L",
                "Base Unit of Measure": "EA",
                "Tax": "0.20"
            }
        ],
        "plants": [
            { "id": 1, "Plant Code": "1020", "Description": "Depot Mohammedia" },
            { "id": 2, "Plant Code": "1030", "Description": "Depot Jorf Lasfar" }
        ],
        "trucks": [
            {
                "id": 1,
                "Vehicle": "12345-A-6",
                "MPGI": "Bulk fuel",
                "Vehicule Capacity": 30000,
                "Driver name": "Youssef Amrani",
                "Driver CIN": "BE123456",
                "Haulier name": "Transports Atlas",
                "Seals": 3,
                "Comp1": 10000,
                "Comp2": 10000,
                "Comp3": 10000
            },
            {
                "id": 2,
                "Vehicle": "67890-B-1",
                "MPGI": "Packed goods",
                "Vehicule Capacity": 12000,
                "Driver name": "Karim Bennani"
            }
        ]
    })
}

/// Lookup cache built from [`reference_fixture`].
///
/// # Panics
///
/// Panics if the fixture does not deserialize.
#[must_use]
pub fn lookup_fixture() -> LookupCache {
    let value = reference_fixture();
    let list = |kind: &str| value.get(kind).cloned().unwrap_or_else(|| json!([]));
    let data = ReferenceData {
        clients: serde_json::from_value(list("clients")).expect("clients fixture"),
        products: serde_json::from_value(list("products")).expect("products fixture"),
        plants: serde_json::from_value(list("plants")).expect("plants fixture"),
        trucks: serde_json::from_value(list("trucks")).expect("trucks fixture"),
    };
    LookupCache::new(data)
}
