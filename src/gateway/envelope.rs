//! Usage: Status + opaque JSON body, relayed to the caller unchanged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Envelope {
    pub(crate) status: StatusCode,
    pub(crate) body: Value,
}

impl Envelope {
    pub(crate) fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub(crate) fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
