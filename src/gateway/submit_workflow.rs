//! Usage: Submit-and-notify workflow.
//!
//! PATCH the submission, look up the project manager's email, then post a notification.
//! Steps run strictly in order and stop at the first failure. Nothing undoes an earlier
//! step when a later one fails.

use super::downstream::{DownstreamClient, DownstreamRequest};
use super::envelope::Envelope;
use super::errors::GatewayError;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

pub(super) const SUBMIT_PATH: &str = "/timesheet/submit";
pub(super) const MANAGER_EMAIL_PATH: &str = "/manager/email";
pub(super) const NOTIFICATION_PATH: &str = "/notification";

const NOTIFICATION_SUBJECT: &str = "Timesheet submitted";
const NOTIFICATION_MESSAGE: &str = "A timesheet has been submitted for a project you manage";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct NotificationPayload {
    pub(crate) email: Vec<String>,
    pub(crate) subject: &'static str,
    pub(crate) message: &'static str,
}

impl NotificationPayload {
    pub(crate) fn timesheet_submitted(manager_email: String) -> Self {
        Self {
            email: vec![manager_email],
            subject: NOTIFICATION_SUBJECT,
            message: NOTIFICATION_MESSAGE,
        }
    }
}

pub(super) fn submit_success() -> Envelope {
    Envelope::new(
        StatusCode::OK,
        json!({ "status": "success", "message": "Submit successful" }),
    )
}

/// `id` as the last manager lookup path segment: strings verbatim, numbers in decimal.
/// Empty, `.` and `..` never name a single manager and are rejected.
pub(super) fn manager_id_segment(body: &Value) -> Result<String, GatewayError> {
    let id = match body.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(GatewayError::MissingField("id")),
    };
    if matches!(id.as_str(), "" | "." | "..") {
        return Err(GatewayError::MissingField("id"));
    }
    Ok(id)
}

pub(super) fn manager_email(lookup: &Value) -> Result<String, GatewayError> {
    lookup
        .get("data")
        .and_then(|data| data.get(0))
        .and_then(|first| first.get("email"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(GatewayError::MissingField("data[0].email"))
}

fn expect_success(envelope: Envelope) -> Result<Envelope, GatewayError> {
    if envelope.is_success() {
        Ok(envelope)
    } else {
        Err(GatewayError::DownstreamStatus(envelope))
    }
}

pub(super) async fn submit_and_notify(
    downstream: &DownstreamClient,
    body: Value,
) -> Result<Envelope, GatewayError> {
    // The id is only needed after the submission went through; a missing id still
    // fails the request, but not before step 1 has run.
    let manager_id = manager_id_segment(&body);

    let submitted = expect_success(
        downstream
            .send(DownstreamRequest::patch(SUBMIT_PATH, body))
            .await?,
    )?;
    tracing::debug!(body = %submitted.body, "timesheet submit acknowledged");

    let manager_id = manager_id?;
    let lookup = expect_success(
        downstream
            .send(DownstreamRequest::get(MANAGER_EMAIL_PATH).with_segment(manager_id))
            .await?,
    )?;
    tracing::debug!(body = %lookup.body, "manager email lookup");

    let payload = NotificationPayload::timesheet_submitted(manager_email(&lookup.body)?);
    let notification = serde_json::to_value(&payload)?;
    let notified = expect_success(
        downstream
            .send(DownstreamRequest::post(NOTIFICATION_PATH, notification))
            .await?,
    )?;
    tracing::debug!(body = %notified.body, "manager notified");

    Ok(submit_success())
}
