use axum::{
    http::HeaderName,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use super::events::{trace_requests, TRACE_ID_HEADER};
use super::manager::GatewayAppState;
use super::timesheet::{create_timesheet, get_timesheet, submit_timesheet};
use super::timesheet_records::create_timesheet_record;
use super::util::now_unix_seconds;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app: &'static str,
    version: &'static str,
    ts: u64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "timesheet-gateway",
        version: env!("CARGO_PKG_VERSION"),
        ts: now_unix_seconds(),
    })
}

async fn root() -> &'static str {
    "Timesheet Gateway is running"
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(TRACE_ID_HEADER)])
}

pub(super) fn build_router(state: GatewayAppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/timesheet", get(get_timesheet).post(create_timesheet))
        .route("/api/timesheet/submit", patch(submit_timesheet))
        .route("/api/timesheet-records", post(create_timesheet_record))
        .layer(middleware::from_fn(trace_requests))
        .layer(cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests;
