//! Usage: Timesheet record endpoint.

use super::downstream::DownstreamRequest;
use super::errors::GatewayError;
use super::events::{RequestLog, TraceId};
use super::manager::GatewayAppState;
use super::util::run_operation;
use axum::{extract::State, response::Response, Extension, Json};
use serde_json::Value;

pub(super) const TIMERECORD_PATH: &str = "/timesheet/timerecord";

pub(super) async fn create_timesheet_record(
    State(state): State<GatewayAppState>,
    Extension(trace_id): Extension<TraceId>,
    Json(body): Json<Value>,
) -> Response {
    let log = RequestLog::start(trace_id, "POST", "/api/timesheet-records");
    tracing::debug!(trace_id = %log.trace_id, %body, "create timesheet record");

    let downstream = state.downstream.clone();
    let result = run_operation("create_timesheet_record", async move {
        downstream
            .send(DownstreamRequest::post(TIMERECORD_PATH, body))
            .await
            .map_err(GatewayError::from)
    })
    .await;

    log.finish(result)
}
