//! Import pipeline against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use fuelops_admin::import::{ImportError, ImportPipeline};
use fuelops_admin::session::MemoryTokenStore;
use fuelops_core::{ImportKind, OrderRegime};
use fuelops_integration_tests::{MockBackend, MockResponse, lookup_fixture};
use serde_json::json;

fn clients_csv(rows: usize) -> String {
    let mut csv = String::from("Customer Sold to,Customer Sold to name,Customer Ship to\n");
    for i in 1..=rows {
        csv.push_str(&format!("{},Client {i:03},{}\n", 100_000 + i, 100_000 + i));
    }
    csv
}

fn import_response(count: usize) -> MockResponse {
    MockResponse::json(json!({
        "status": "success",
        "recordsImported": count,
        "errors": [],
        "successes": []
    }))
}

#[tokio::test]
async fn test_150_clients_go_out_in_two_batches() {
    let backend = MockBackend::start().await;
    backend.on("POST", "/api/import/clients", import_response(100));
    backend.on("POST", "/api/import/clients", import_response(50));

    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
    let lookup = lookup_fixture();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress = Arc::clone(&seen);
    let pipeline = ImportPipeline::new(&api, &lookup, 100)
        .on_progress(move |p| progress.lock().unwrap().push(p.percent));

    let report = pipeline
        .run(ImportKind::Clients, "clients.csv", clients_csv(150).as_bytes())
        .await
        .unwrap();

    assert_eq!(report.records_imported, 150);
    assert!(report.errors.is_empty());
    assert_eq!(report.batches_sent, 2);
    assert_eq!(*seen.lock().unwrap(), vec![67, 100]);

    let calls = backend.requests_to("POST", "/api/import/clients");
    assert_eq!(calls.len(), 2);
    let first = calls[0].text();
    assert!(first.contains("name=\"file\""));
    assert!(first.contains("clients_batch_1.csv"));
    assert!(first.contains("Client 100,"));
    assert!(!first.contains("Client 101,"));
    assert!(calls[1].text().contains("Client 150,"));
    assert!(calls[0].content_type.as_deref().unwrap().starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_invalid_order_file_sends_nothing() {
    let backend = MockBackend::start().await;
    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
    let lookup = lookup_fixture();

    let csv = "Sales Order,Customer,Ship To Party,Plant,Material Code,Order Qty\n\
               4500012,100234,100234,1020,200123,12000\n\
               4500013,100234,100234,1020,999999,abc\n";
    let err = ImportPipeline::new(&api, &lookup, 100)
        .run(ImportKind::Orders, "orders.csv", csv.as_bytes())
        .await
        .unwrap_err();

    let ImportError::Rejected(errors) = err else {
        panic!("expected a rejected file, got {err}");
    };
    assert!(errors.iter().all(|e| e.row == 2));
    assert!(errors.iter().any(|e| e.message.contains("999999")));
    assert!(errors.iter().any(|e| e.message.contains("not a number")));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_zcon_orders_are_rewritten_before_submission() {
    let backend = MockBackend::start().await;
    backend.on(
        "POST",
        "/api/orders/import",
        MockResponse::json(json!({ "ordersCreated": 2, "errors": [] })),
    );
    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
    let lookup = lookup_fixture();

    let csv = "Sales Order,Item,Order Type,Customer,Ship To Party,Plant,Material Code,Order Qty,Requested delivery date,order_type\n\
               4500012,10,ZOR,100234,100234,1020,000200123,12000,02/05/2024,VRAC\n\
               4500013,10,ZCON,CP1030,,1020,200123,18000,2024-05-02,VRAC\n";
    let report = ImportPipeline::new(&api, &lookup, 100)
        .run(ImportKind::Orders, "orders.csv", csv.as_bytes())
        .await
        .unwrap();
    assert_eq!(report.records_imported, 2);

    let calls = backend.requests_to("POST", "/api/orders/import");
    assert_eq!(calls.len(), 1);
    let body = calls[0].json();
    let lines = body.as_array().unwrap();
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0]["Material Code"], "200123");
    assert_eq!(lines[0]["Requested delivery date"], "2024-05-02");
    assert_eq!(lines[0]["Customer"], "100234");

    assert_eq!(lines[1]["Customer"], "CP1030");
    assert_eq!(lines[1]["Ship To Party"], "CP1030");
    assert_eq!(lines[1]["City(Ship To)"], "Casablanca");
    assert_eq!(lines[1]["Customer Name"], "Depot Jorf Lasfar");
    assert_eq!(lines[1]["order_type"], json!(OrderRegime::Vrac));
}

#[tokio::test]
async fn test_failed_batch_keeps_partial_report() {
    let backend = MockBackend::start().await;
    backend.on("POST", "/api/import/clients", import_response(2));
    backend.on(
        "POST",
        "/api/import/clients",
        MockResponse::status(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "database unavailable" }),
        ),
    );
    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
    let lookup = lookup_fixture();

    let err = ImportPipeline::new(&api, &lookup, 2)
        .run(ImportKind::Clients, "clients.csv", clients_csv(6).as_bytes())
        .await
        .unwrap_err();

    let ImportError::BatchFailed { batch, partial, .. } = err else {
        panic!("expected a failed batch, got {err}");
    };
    assert_eq!(batch, 2);
    assert_eq!(partial.records_imported, 2);
    assert_eq!(partial.rows_submitted, 2);
    // The third batch is never sent.
    assert_eq!(backend.requests_to("POST", "/api/import/clients").len(), 2);
}

#[tokio::test]
async fn test_missing_price_is_a_warning() {
    let backend = MockBackend::start().await;
    backend.on(
        "POST",
        "/api/orders/import",
        MockResponse::json(json!({
            "ordersCreated": 1,
            "errors": [{ "row": 1, "error": "No price found for this product/client combination" }]
        })),
    );
    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));
    let lookup = lookup_fixture();

    let csv = "Sales Order,Customer,Ship To Party,Plant,Material Code,Order Qty\n\
               4500012,100234,100234,1020,200123,12000\n";
    let report = ImportPipeline::new(&api, &lookup, 100)
        .run(ImportKind::Orders, "orders.csv", csv.as_bytes())
        .await
        .unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(!report.is_clean());
}
