//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::Config;
use crate::metrics::Metrics;
use crate::models::signal::{Instrument, RankedSignalTable, SignalDirection};
use crate::models::snapshot::{Indicator, Snapshot, SnapshotRow};
use crate::services::cache::SnapshotCache;
use crate::services::market_data::LiveMacroProvider;
use crate::signals::engine::SignalEngine;

pub const NO_SIGNALS_MESSAGE: &str = "No actionable signals right now – check again later.";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub cache: Arc<SnapshotCache>,
    pub engine: Arc<SignalEngine>,
}

/// Degraded while the latest snapshot has missing indicators.
#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub missing_indicators: Vec<Indicator>,
}

impl HealthStatus {
    pub fn observe(&mut self, snapshot: &Snapshot) {
        self.missing_indicators = snapshot.missing_indicators();
        self.status = if self.missing_indicators.is_empty() {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        };
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            missing_indicators: Vec::new(),
        }
    }
}

/// One row of the ranked signal table.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRow {
    pub symbol: Instrument,
    pub direction: SignalDirection,
    pub confidence: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
    pub snapshot: Vec<SnapshotRow>,
    pub signals: Vec<SignalRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DashboardResponse {
    pub fn build(snapshot: &Snapshot, table: &RankedSignalTable) -> Self {
        Self {
            as_of: snapshot.as_of(),
            snapshot: snapshot.rows(),
            signals: signal_rows(table),
            message: table.is_empty().then(|| NO_SIGNALS_MESSAGE.to_string()),
        }
    }
}

fn signal_rows(table: &RankedSignalTable) -> Vec<SignalRow> {
    table
        .iter()
        .map(|s| SignalRow {
            symbol: s.instrument,
            direction: s.direction,
            confidence: s.confidence,
            reason: s.reason.clone(),
        })
        .collect()
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "missing_indicators": health.missing_indicators,
        "service": "macrosignals"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

async fn load_snapshot(state: &AppState) -> Arc<Snapshot> {
    let snapshot = state.cache.get().await;
    state.health.write().await.observe(&snapshot);
    snapshot
}

async fn current_dashboard(state: &AppState) -> DashboardResponse {
    let snapshot = load_snapshot(state).await;
    let table = state.engine.derive(&snapshot);
    state.metrics.signals_emitted.set(table.len() as i64);
    DashboardResponse::build(&snapshot, &table)
}

async fn get_snapshot(State(state): State<AppState>) -> Json<Vec<SnapshotRow>> {
    let snapshot = load_snapshot(&state).await;
    Json(snapshot.rows())
}

async fn get_signals(State(state): State<AppState>) -> Json<Vec<SignalRow>> {
    Json(current_dashboard(&state).await.signals)
}

async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(current_dashboard(&state).await)
}

/// Drop the cached snapshot and rebuild the dashboard from fresh data.
async fn refresh_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    state.cache.invalidate().await;
    info!("Snapshot cache invalidated by refresh request");
    Json(current_dashboard(&state).await)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/signals", get(get_signals))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/refresh", post(refresh_dashboard))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let provider = LiveMacroProvider::new(&config)?.with_metrics(metrics.clone());
    let cache = Arc::new(SnapshotCache::with_system_clock(
        Arc::new(provider),
        config.cache_ttl,
    ));
    let cache_ttl_secs = cache.ttl().as_secs();

    if config.fred_api_key.is_none() {
        tracing::warn!("FRED_KEY is not set - FRED indicators will be reported as missing");
    }

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        cache,
        engine: Arc::new(SignalEngine::standard()),
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        cache_ttl_secs = cache_ttl_secs,
        "Dashboard available at http://0.0.0.0:{}/api/dashboard",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
