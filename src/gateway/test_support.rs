//! Usage: In-process stub of the downstream timesheet API for tests.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::downstream::DownstreamClient;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) body: Option<Value>,
}

#[derive(Clone, Default)]
struct StubState {
    responses: Arc<HashMap<(Method, String), (StatusCode, String)>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[derive(Default)]
pub(crate) struct StubDownstreamBuilder {
    responses: HashMap<(Method, String), (StatusCode, String)>,
}

impl StubDownstreamBuilder {
    pub(crate) fn json(
        self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: Value,
    ) -> Self {
        self.raw(method, path, status, body.to_string())
    }

    pub(crate) fn raw(
        mut self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: String,
    ) -> Self {
        self.responses.insert((method, path.to_string()), (status, body));
        self
    }

    pub(crate) async fn spawn(self) -> StubDownstream {
        let state = StubState {
            responses: Arc::new(self.responses),
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        let calls = state.calls.clone();
        let app = Router::new().fallback(record_and_reply).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub downstream");
        let addr = listener.local_addr().expect("stub local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        StubDownstream {
            base_url: format!("http://{addr}/test"),
            calls,
        }
    }
}

pub(crate) struct StubDownstream {
    pub(crate) base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubDownstream {
    pub(crate) fn builder() -> StubDownstreamBuilder {
        StubDownstreamBuilder::default()
    }

    pub(crate) fn client(&self) -> DownstreamClient {
        DownstreamClient::new(reqwest::Client::new(), &self.base_url)
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("stub calls lock").clone()
    }
}

async fn record_and_reply(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/test")
        .unwrap_or(uri.path())
        .to_string();
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };

    state.calls.lock().expect("stub calls lock").push(RecordedCall {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body,
    });

    match state.responses.get(&(method, path)) {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"message":"no stub route"}"#.to_string(),
        )
            .into_response(),
    }
}

/// A base URL nothing listens on.
pub(crate) fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe local addr");
    drop(listener);
    format!("http://{addr}/test")
}
