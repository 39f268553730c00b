//! Usage: Downstream timesheet API client (fixed base URL, JSON in / JSON out).

use super::envelope::Envelope;
use crate::settings::GatewaySettings;
use axum::http::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DownstreamError {
    #[error("invalid downstream url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("downstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("downstream returned a non-json body (status {status}): {source}")]
    InvalidJson {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl DownstreamError {
    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(err) if err.is_timeout() => "GW_UPSTREAM_TIMEOUT",
            Self::Transport(err) if err.is_connect() => "GW_UPSTREAM_CONNECT_FAILED",
            Self::InvalidJson { .. } => "GW_UPSTREAM_INVALID_JSON",
            Self::InvalidUrl { .. } | Self::Transport(_) => "GW_INTERNAL_ERROR",
        }
    }
}

/// One downstream call: method, path below the base URL, query pairs, optional JSON body.
///
/// `segments` are caller-supplied values appended after `path`, each percent-encoded as
/// exactly one path segment.
#[derive(Debug, Clone)]
pub(crate) struct DownstreamRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) segments: Vec<String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
}

impl DownstreamRequest {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub(crate) fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PATCH,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub(crate) fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub(crate) fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

#[derive(Clone)]
pub(crate) struct DownstreamClient {
    client: reqwest::Client,
    base_url: Arc<str>,
}

impl DownstreamClient {
    pub(crate) fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub(crate) fn from_settings(settings: &GatewaySettings) -> Result<Self, String> {
        let mut builder = reqwest::Client::builder().user_agent(format!(
            "timesheet-gateway/{}",
            env!("CARGO_PKG_VERSION")
        ));
        if settings.downstream_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(u64::from(
                settings.downstream_timeout_seconds,
            )));
        }
        let client = builder
            .build()
            .map_err(|e| format!("GW_HTTP_CLIENT_INIT: {e}"))?;

        Ok(Self::new(client, &settings.downstream_base_url))
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, segments: &[String]) -> Result<reqwest::Url, DownstreamError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = reqwest::Url::parse(&raw).map_err(|e| DownstreamError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| DownstreamError::InvalidUrl {
                    url: raw,
                    reason: "url cannot carry path segments".to_string(),
                })?
                .extend(segments);
        }

        Ok(url)
    }

    /// Any response that arrives and parses as JSON is returned as-is, whatever its status.
    pub(crate) async fn send(&self, req: DownstreamRequest) -> Result<Envelope, DownstreamError> {
        let DownstreamRequest {
            method,
            path,
            segments,
            query,
            body,
        } = req;

        let url = self.url(&path, &segments)?;
        let url_path = url.path().to_string();
        let mut builder = self.client.request(method.clone(), url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice::<Value>(&bytes)
            .map_err(|source| DownstreamError::InvalidJson { status, source })?;

        tracing::debug!(
            %method,
            path = %url_path,
            status = status.as_u16(),
            "downstream call finished"
        );
        Ok(Envelope::new(status, body))
    }
}
