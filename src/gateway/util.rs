use super::envelope::Envelope;
use super::errors::GatewayError;
use crate::detached;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TRACE_SEQ: AtomicU64 = AtomicU64::new(0);

pub(super) fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub(super) fn new_trace_id() -> String {
    let seq = TRACE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("ts-{:x}-{:04x}", now_unix_millis(), seq & 0xffff)
}

/// Gateway operations run detached from the inbound connection.
pub(super) async fn run_operation<F>(
    label: &'static str,
    op: F,
) -> Result<Envelope, GatewayError>
where
    F: Future<Output = Result<Envelope, GatewayError>> + Send + 'static,
{
    detached::run(label, op)
        .await
        .map_err(GatewayError::TaskJoin)?
}
