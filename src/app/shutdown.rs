//! Usage: Best-effort gateway stop on process exit.

use crate::gateway::GatewayManager;
use std::time::Duration;

const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const ABORT_GRACE: Duration = Duration::from_secs(1);

pub(crate) async fn stop_gateway_best_effort(manager: &mut GatewayManager) {
    let Some((shutdown, mut task)) = manager.take_running() else {
        return;
    };

    let _ = shutdown.send(());

    if tokio::time::timeout(STOP_TIMEOUT, &mut task).await.is_err() {
        tracing::warn!(
            "gateway stop timed out after {}s, aborting server task",
            STOP_TIMEOUT.as_secs()
        );
        task.abort();
        let _ = tokio::time::timeout(ABORT_GRACE, &mut task).await;
    }

    tracing::info!("gateway stopped");
}
