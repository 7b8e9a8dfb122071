//! Integration tests for the API Server
//!
//! Tests health checks, metrics, and the snapshot and signal endpoints.


use macrosignals::models::snapshot::{Indicator, Snapshot};
use serde_json::Value;
use std::time::Duration;

use test_utils::TestApiServer;

fn hawkish_snapshot() -> Snapshot {
    Snapshot::builder()
        .with(Indicator::PolicyRateChangeBps, 30.0)
        .with(Indicator::RealYield10Y, 1.5)
        .with(Indicator::GoldPrice, 2310.5)
        .build()
}

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "macrosignals");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(body.contains("http_requests_total"), "Expected http_requests_total metric");
    assert!(
        body.contains("http_request_duration_seconds"),
        "Expected http_request_duration_seconds metric"
    );
    assert!(
        body.contains("http_requests_in_flight"),
        "Expected http_requests_in_flight metric"
    );
}

#[tokio::test]
async fn snapshot_endpoint_lists_every_indicator() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;
    let response = app.server.get("/api/snapshot").await;
    assert_eq!(response.status_code(), 200);

    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), Indicator::ALL.len());
    assert_eq!(rows[0]["indicator"], "real_yield_10y");
    assert_eq!(rows[0]["value"], 1.5);

    let vix = rows.iter().find(|r| r["indicator"] == "vix").unwrap();
    assert!(vix["value"].is_null());
}

#[tokio::test]
async fn signals_endpoint_returns_ranked_rows() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;
    let response = app.server.get("/api/signals").await;
    assert_eq!(response.status_code(), 200);

    let rows: Vec<Value> = response.json();
    let summary: Vec<(String, String, u64)> = rows
        .iter()
        .map(|r| {
            (
                r["symbol"].as_str().unwrap().to_string(),
                r["direction"].as_str().unwrap().to_string(),
                r["confidence"].as_u64().unwrap(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("EURUSD".to_string(), "SHORT".to_string(), 70),
            ("XAUUSD".to_string(), "SHORT".to_string(), 70),
            ("USDJPY".to_string(), "LONG".to_string(), 65),
        ]
    );
}

#[tokio::test]
async fn dashboard_reports_when_nothing_fires() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/dashboard").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["signals"].as_array().unwrap().len(), 0);
    assert!(body["message"].as_str().unwrap().contains("No actionable signals"));
}

#[tokio::test]
async fn dashboard_uses_cached_snapshot() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;

    for _ in 0..3 {
        let response = app.server.get("/api/dashboard").await;
        assert_eq!(response.status_code(), 200);
    }
    assert_eq!(app.provider.fetch_count(), 1);

    app.clock.advance(Duration::from_secs(3600));
    let _ = app.server.get("/api/signals").await;
    assert_eq!(app.provider.fetch_count(), 2);
}

#[tokio::test]
async fn refresh_invalidates_cache() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;
    let _ = app.server.get("/api/dashboard").await;

    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body.get("message").is_none());
    assert_eq!(body["signals"].as_array().unwrap().len(), 3);
    assert_eq!(app.provider.fetch_count(), 2);
}

#[tokio::test]
async fn signals_gauge_tracks_latest_table() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;
    let _ = app.server.get("/api/dashboard").await;
    assert_eq!(app.metrics.signals_emitted.get(), 3);
}

#[tokio::test]
async fn api_server_handles_sequential_requests() {
    let app = TestApiServer::new().await;

    for _ in 0..10 {
        let response = app.server.get("/health").await;
        assert_eq!(response.status_code(), 200);
    }
}

#[tokio::test]
async fn health_degrades_while_indicators_are_missing() {
    let app = TestApiServer::with_snapshot(hawkish_snapshot()).await;
    let _ = app.server.get("/api/snapshot").await;

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
    let missing = body["missing_indicators"].as_array().unwrap();
    assert_eq!(missing.len(), Indicator::ALL.len() - 3);
    assert!(missing.contains(&Value::from("vix")));
}

#[tokio::test]
async fn health_stays_healthy_with_complete_snapshot() {
    let snapshot = Indicator::ALL
        .iter()
        .fold(Snapshot::builder(), |builder, indicator| builder.with(*indicator, 1.0))
        .build();
    let app = TestApiServer::with_snapshot(snapshot).await;
    let _ = app.server.get("/api/dashboard").await;

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["missing_indicators"].as_array().unwrap().is_empty());
}
