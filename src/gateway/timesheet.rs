//! Usage: Timesheet endpoints (list/get, create, submit-and-notify).

use super::downstream::DownstreamRequest;
use super::errors::GatewayError;
use super::events::{RequestLog, TraceId};
use super::manager::GatewayAppState;
use super::submit_workflow::submit_and_notify;
use super::util::run_operation;
use axum::{
    extract::{Query, State},
    response::Response,
    Extension, Json,
};
use serde_json::Value;

pub(super) const TIMESHEET_PATH: &str = "/timesheet";

pub(super) async fn get_timesheet(
    State(state): State<GatewayAppState>,
    Extension(trace_id): Extension<TraceId>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let log = RequestLog::start(trace_id, "GET", "/api/timesheet");
    tracing::debug!(trace_id = %log.trace_id, ?query, "get timesheet");

    let downstream = state.downstream.clone();
    let result = run_operation("get_timesheet", async move {
        let req = DownstreamRequest::get(TIMESHEET_PATH).with_query(query);
        downstream.send(req).await.map_err(GatewayError::from)
    })
    .await;

    log.finish(result)
}

pub(super) async fn create_timesheet(
    State(state): State<GatewayAppState>,
    Extension(trace_id): Extension<TraceId>,
    Json(body): Json<Value>,
) -> Response {
    let log = RequestLog::start(trace_id, "POST", "/api/timesheet");
    tracing::debug!(trace_id = %log.trace_id, %body, "create timesheet");

    let downstream = state.downstream.clone();
    let result = run_operation("create_timesheet", async move {
        downstream
            .send(DownstreamRequest::post(TIMESHEET_PATH, body))
            .await
            .map_err(GatewayError::from)
    })
    .await;

    log.finish(result)
}

pub(super) async fn submit_timesheet(
    State(state): State<GatewayAppState>,
    Extension(trace_id): Extension<TraceId>,
    Json(body): Json<Value>,
) -> Response {
    let log = RequestLog::start(trace_id, "PATCH", "/api/timesheet/submit");
    tracing::debug!(trace_id = %log.trace_id, %body, "submit timesheet");

    let downstream = state.downstream.clone();
    let result = run_operation("submit_timesheet", async move {
        submit_and_notify(&downstream, body).await
    })
    .await;

    log.finish(result)
}
