use crate::settings::GatewaySettings;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::downstream::DownstreamClient;
use super::routes::build_router;
use super::GatewayStatus;

struct RunningGateway {
    port: u16,
    base_url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub(crate) type RunningGatewayHandles = (oneshot::Sender<()>, JoinHandle<()>);

#[derive(Default)]
pub struct GatewayManager {
    running: Option<RunningGateway>,
}

#[derive(Clone)]
pub(super) struct GatewayAppState {
    pub(super) downstream: DownstreamClient,
}

fn bind(host: &str, port: u16) -> Result<(SocketAddr, std::net::TcpListener), String> {
    let std_listener = std::net::TcpListener::bind((host, port))
        .map_err(|e| format!("GW_PORT_IN_USE: failed to bind {host}:{port}: {e}"))?;
    std_listener
        .set_nonblocking(true)
        .map_err(|e| format!("GW_LISTENER_INIT: {e}"))?;
    let local_addr = std_listener
        .local_addr()
        .map_err(|e| format!("GW_LISTENER_INIT: {e}"))?;
    Ok((local_addr, std_listener))
}

fn display_base_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://127.0.0.1:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

impl GatewayManager {
    pub fn status(&self) -> GatewayStatus {
        match &self.running {
            Some(r) => GatewayStatus {
                running: true,
                port: Some(r.port),
                base_url: Some(r.base_url.clone()),
            },
            None => GatewayStatus {
                running: false,
                port: None,
                base_url: None,
            },
        }
    }

    /// Binds the configured address (no fallback port) and serves on a background task.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, settings: &GatewaySettings) -> Result<GatewayStatus, String> {
        if self.running.is_some() {
            return Ok(self.status());
        }

        let (bind_addr, std_listener) = bind(&settings.listen_host, settings.port)?;
        let port = bind_addr.port();
        let base_url = display_base_url(bind_addr);

        let downstream = DownstreamClient::from_settings(settings)?;
        tracing::info!(
            %bind_addr,
            downstream = downstream.base_url(),
            "gateway listening"
        );

        let app = build_router(GatewayAppState { downstream });
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::from_std(std_listener) {
                Ok(l) => l,
                Err(err) => {
                    tracing::error!("gateway listener error on {bind_addr}: {err}");
                    return;
                }
            };

            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = serve.await {
                tracing::error!("gateway server error on {bind_addr}: {err}");
            }
        });

        self.running = Some(RunningGateway {
            port,
            base_url,
            shutdown: shutdown_tx,
            task,
        });

        Ok(self.status())
    }

    pub(crate) fn take_running(&mut self) -> Option<RunningGatewayHandles> {
        self.running.take().map(|r| (r.shutdown, r.task))
    }
}
