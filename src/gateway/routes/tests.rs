use crate::gateway::test_support::{refused_base_url, StubDownstream};
use crate::gateway::GatewayManager;
use crate::settings::GatewaySettings;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

struct RunningGateway {
    manager: GatewayManager,
    base_url: String,
}

fn start_gateway(downstream_base_url: &str) -> RunningGateway {
    let settings = GatewaySettings {
        listen_host: "127.0.0.1".to_string(),
        port: 0,
        downstream_base_url: downstream_base_url.to_string(),
        ..GatewaySettings::default()
    };
    let mut manager = GatewayManager::default();
    let status = manager.start(&settings).expect("gateway start");
    RunningGateway {
        manager,
        base_url: status.base_url.expect("gateway base url"),
    }
}

async fn read_json(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.json::<Value>().await.expect("gateway json body");
    (status, body)
}

#[tokio::test]
async fn get_timesheet_relays_status_and_body_with_query() {
    let stub = StubDownstream::builder()
        .json(
            Method::GET,
            "/timesheet",
            StatusCode::OK,
            json!({ "data": [{ "id": 1, "hours": 8 }] }),
        )
        .spawn()
        .await;
    let gateway = start_gateway(&stub.base_url);

    let resp = reqwest::Client::new()
        .get(format!("{}/api/timesheet?user_id=3&week=2026-W42", gateway.base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.headers().contains_key("x-trace-id"));
    let (status, body) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [{ "id": 1, "hours": 8 }] }));
    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/timesheet");
    assert_eq!(calls[0].query.as_deref(), Some("user_id=3&week=2026-W42"));
    assert!(gateway.manager.status().running);
}

#[tokio::test]
async fn downstream_error_status_is_relayed() {
    let stub = StubDownstream::builder()
        .json(
            Method::GET,
            "/timesheet",
            StatusCode::NOT_FOUND,
            json!({ "message": "timesheet not found" }),
        )
        .spawn()
        .await;
    let gateway = start_gateway(&stub.base_url);

    let resp = reqwest::get(format!("{}/api/timesheet?id=99", gateway.base_url))
        .await
        .unwrap();
    let (status, body) = read_json(resp).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "timesheet not found" }));
}

#[tokio::test]
async fn create_endpoints_forward_body_unchanged() {
    let created = json!({ "status": "success", "data": { "id": 5 } });
    let stub = StubDownstream::builder()
        .json(
            Method::POST,
            "/timesheet",
            StatusCode::CREATED,
            created.clone(),
        )
        .json(
            Method::POST,
            "/timesheet/timerecord",
            StatusCode::CREATED,
            created.clone(),
        )
        .spawn()
        .await;
    let gateway = start_gateway(&stub.base_url);
    let client = reqwest::Client::new();

    let timesheet = json!({ "user_id": 3, "project_id": 7, "week": "2026-W42", "extra": null });
    let resp = client
        .post(format!("{}/api/timesheet", gateway.base_url))
        .json(&timesheet)
        .send()
        .await
        .unwrap();
    assert_eq!(read_json(resp).await, (StatusCode::CREATED, created.clone()));

    let record = json!({ "timesheet_id": 5, "entries": [{ "day": "mon", "hours": 7.5 }] });
    let resp = client
        .post(format!("{}/api/timesheet-records", gateway.base_url))
        .json(&record)
        .send()
        .await
        .unwrap();
    assert_eq!(read_json(resp).await, (StatusCode::CREATED, created));

    let calls = stub.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].path, "/timesheet");
    assert_eq!(calls[0].body, Some(timesheet));
    assert_eq!(calls[1].path, "/timesheet/timerecord");
    assert_eq!(calls[1].body, Some(record));
}

#[tokio::test]
async fn submit_returns_fixed_success_envelope() {
    let stub = StubDownstream::builder()
        .json(
            Method::PATCH,
            "/timesheet/submit",
            StatusCode::OK,
            json!({ "message": "submitted" }),
        )
        .json(
            Method::GET,
            "/manager/email/42",
            StatusCode::OK,
            json!({ "data": [{ "email": "pm@example.com" }] }),
        )
        .json(
            Method::POST,
            "/notification",
            StatusCode::OK,
            json!({ "message": "sent" }),
        )
        .spawn()
        .await;
    let gateway = start_gateway(&stub.base_url);

    let resp = reqwest::Client::new()
        .patch(format!("{}/api/timesheet/submit", gateway.base_url))
        .json(&json!({ "id": 42 }))
        .send()
        .await
        .unwrap();
    let (status, body) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "success", "message": "Submit successful" })
    );
    assert_eq!(stub.calls().len(), 3);
}

#[tokio::test]
async fn transport_failure_yields_generic_500_on_every_route() {
    let gateway = start_gateway(&refused_base_url());
    let client = reqwest::Client::new();
    let expected = (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "status": "error", "message": "Internal server error" }),
    );

    let resp = client
        .get(format!("{}/api/timesheet", gateway.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(read_json(resp).await, expected);

    for (method, path) in [
        (Method::POST, "/api/timesheet"),
        (Method::PATCH, "/api/timesheet/submit"),
        (Method::POST, "/api/timesheet-records"),
    ] {
        let resp = client
            .request(method, format!("{}{path}", gateway.base_url))
            .json(&json!({ "id": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(read_json(resp).await, expected, "route {path}");
    }
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let gateway = start_gateway(&refused_base_url());

    let resp = reqwest::Client::new()
        .request(
            Method::OPTIONS,
            format!("{}/api/timesheet/submit", gateway.base_url),
        )
        .header("origin", "http://frontend.example")
        .header("access-control-request-method", "PATCH")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let gateway = start_gateway(&refused_base_url());

    let resp = reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .unwrap();
    let (status, body) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["app"], "timesheet-gateway");
}

#[tokio::test]
async fn stop_shuts_the_listener_down() {
    let mut gateway = start_gateway(&refused_base_url());

    crate::app::shutdown::stop_gateway_best_effort(&mut gateway.manager).await;

    assert!(!gateway.manager.status().running);
    assert!(reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .is_err());
}

#[tokio::test]
async fn rejected_body_and_unknown_route_still_carry_trace_id() {
    let stub = StubDownstream::builder().spawn().await;
    let gateway = start_gateway(&stub.base_url);
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/timesheet", gateway.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().contains_key("x-trace-id"));

    let resp = client
        .patch(format!("{}/api/timesheet/submit", gateway.base_url))
        .body(r#"{"id":42}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(resp.headers().contains_key("x-trace-id"));

    let resp = client
        .get(format!("{}/api/unknown", gateway.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key("x-trace-id"));

    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn each_response_gets_its_own_trace_id() {
    let gateway = start_gateway(&refused_base_url());

    let first = reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .unwrap();
    let second = reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .unwrap();

    let first = first.headers().get("x-trace-id").cloned().unwrap();
    let second = second.headers().get("x-trace-id").cloned().unwrap();
    assert_ne!(first, second);
}
