use std::future::Future;

/// Runs `fut` on its own task and waits for it.
///
/// Dropping the returned future (e.g. the inbound client went away) does not cancel the
/// spawned task, so downstream calls that were already issued still run to completion.
pub async fn run<T>(
    label: &'static str,
    fut: impl Future<Output = T> + Send + 'static,
) -> Result<T, String>
where
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| format!("TASK_JOIN: {label}: {e}"))
}
