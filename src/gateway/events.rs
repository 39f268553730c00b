//! Usage: Per-request trace id + log event.
//!
//! `trace_requests` wraps the whole router: it assigns the trace id, stamps `x-trace-id` on
//! every response and logs requests that never reached a gateway operation (extractor
//! rejections, unknown routes). Operations log through `RequestLog` with the same id.

use super::envelope::Envelope;
use super::errors::{normalize, GatewayError};
use super::util::new_trace_id;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::time::Instant;

pub(super) const TRACE_ID_HEADER: &str = "x-trace-id";

#[derive(Debug, Clone)]
pub(super) struct TraceId(pub(super) String);

/// Marks a response whose request event was already emitted by `RequestLog`.
#[derive(Debug, Clone, Copy)]
struct RequestLogged;

#[derive(Debug, Serialize)]
struct GatewayRequestEvent<'a> {
    trace_id: &'a str,
    method: &'a str,
    path: &'a str,
    status: u16,
    error_code: Option<&'static str>,
    duration_ms: u128,
}

pub(super) async fn trace_requests(mut req: Request, next: Next) -> Response {
    let trace_id = new_trace_id();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let mut resp = next.run(req).await;

    if resp.extensions().get::<RequestLogged>().is_none() {
        emit_request_event(&GatewayRequestEvent {
            trace_id: &trace_id,
            method: method.as_str(),
            path: &path,
            status: resp.status().as_u16(),
            error_code: None,
            duration_ms: started.elapsed().as_millis(),
        });
    }

    if let Ok(v) = HeaderValue::from_str(&trace_id) {
        resp.headers_mut().insert(TRACE_ID_HEADER, v);
    }
    resp
}

pub(super) struct RequestLog {
    pub(super) trace_id: String,
    method: &'static str,
    path: &'static str,
    started: Instant,
}

impl RequestLog {
    pub(super) fn start(trace_id: TraceId, method: &'static str, path: &'static str) -> Self {
        Self {
            trace_id: trace_id.0,
            method,
            path,
            started: Instant::now(),
        }
    }

    pub(super) fn finish(self, result: Result<Envelope, GatewayError>) -> Response {
        let (envelope, error_code) = match result {
            Ok(envelope) => (envelope, None),
            Err(err) => {
                let error_code = err.error_code();
                tracing::warn!(
                    trace_id = %self.trace_id,
                    error_code,
                    "{} {} failed: {}",
                    self.method,
                    self.path,
                    err
                );
                (normalize(err), Some(error_code))
            }
        };

        emit_request_event(&GatewayRequestEvent {
            trace_id: &self.trace_id,
            method: self.method,
            path: self.path,
            status: envelope.status.as_u16(),
            error_code,
            duration_ms: self.started.elapsed().as_millis(),
        });

        let mut resp = envelope.into_response();
        resp.extensions_mut().insert(RequestLogged);
        resp
    }
}

fn emit_request_event(event: &GatewayRequestEvent<'_>) {
    match serde_json::to_string(event) {
        Ok(payload) => tracing::info!(target: "gateway::request", "{payload}"),
        Err(err) => tracing::warn!("gateway request event encode failed: {err}"),
    }
}
