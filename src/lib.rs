mod app;
mod detached;
mod gateway;
mod settings;

pub use gateway::{GatewayManager, GatewayStatus};
pub use settings::GatewaySettings;

pub fn run() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("runtime init error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(serve_until_ctrl_c()) {
        eprintln!("timesheet gateway error: {err}");
        std::process::exit(1);
    }
}

async fn serve_until_ctrl_c() -> Result<(), String> {
    let settings_path = settings::path_from_env();
    let settings = settings::read(settings_path.as_deref())?;
    app::logging::init(&settings);

    let mut manager = GatewayManager::default();
    let status = manager.start(&settings)?;
    tracing::info!(
        base_url = status.base_url.as_deref().unwrap_or_default(),
        "timesheet gateway started"
    );

    let signal = tokio::signal::ctrl_c().await;
    app::shutdown::stop_gateway_best_effort(&mut manager).await;
    signal.map_err(|e| format!("SIGNAL_LISTEN: {e}"))
}
