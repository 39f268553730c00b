//! Usage: Error classification + the one normalized gateway error envelope.

use super::downstream::DownstreamError;
use super::envelope::Envelope;
use axum::http::StatusCode;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub(crate) enum GatewayError {
    #[error(transparent)]
    Downstream(#[from] DownstreamError),
    #[error("downstream responded with status {}", .0.status)]
    DownstreamStatus(Envelope),
    #[error("missing or invalid field `{0}`")]
    MissingField(&'static str),
    #[error("failed to encode downstream body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    TaskJoin(String),
}

impl GatewayError {
    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            Self::Downstream(err) => err.error_code(),
            Self::DownstreamStatus(envelope) if envelope.status.is_server_error() => {
                "GW_UPSTREAM_5XX"
            }
            Self::DownstreamStatus(_) => "GW_UPSTREAM_4XX",
            Self::MissingField(_) => "GW_UNEXPECTED_RESPONSE",
            Self::Encode(_) | Self::TaskJoin(_) => "GW_INTERNAL_ERROR",
        }
    }
}

pub(crate) fn internal_error() -> Envelope {
    Envelope::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "status": "error", "message": "Internal server error" }),
    )
}

/// A downstream error status is relayed as received; every other failure collapses
/// into the generic 500 envelope.
pub(crate) fn normalize(err: GatewayError) -> Envelope {
    match err {
        GatewayError::DownstreamStatus(envelope) => envelope,
        _ => internal_error(),
    }
}
