//! Usage: Tracing/logging initialization (stdout + optional rolling file logs + best-effort cleanup).

use crate::settings::GatewaySettings;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;

const LOG_FILE_PREFIX: &str = "timesheet-gateway.log";
const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

static TRACING_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub(crate) fn init(settings: &GatewaySettings) {
    TRACING_INIT.get_or_init(|| {
        if let Err(err) = init_impl(settings) {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(default_env_filter())
                .with_target(false)
                .with_thread_ids(true)
                .try_init();
            eprintln!("tracing init failed: {err}");
        }
    });
}

fn init_impl(settings: &GatewaySettings) -> Result<(), String> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let log_dir = match settings.log_dir.as_deref() {
        Some(dir) => Some(ensure_log_dir(dir)?),
        None => None,
    };

    let file_layer = match log_dir.as_deref() {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            TRACING_GUARD
                .get_or_init(|| Mutex::new(None))
                .lock()
                .map_err(|_| "logging guard mutex poisoned".to_string())?
                .replace(guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(default_env_filter())
        .with(stdout_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("failed to set global tracing subscriber: {e}"))?;

    // Dependencies logging through `log` end up here too; skip if a logger is already set.
    let _ = tracing_log::LogTracer::init();

    match log_dir {
        Some(dir) => {
            tracing::info!(log_dir = %dir.display(), "tracing initialized");
            spawn_cleanup_task(dir, settings.log_retention_days);
        }
        None => tracing::info!("tracing initialized (stdout only)"),
    }

    Ok(())
}

fn default_env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            tracing_subscriber::EnvFilter::new("info,timesheet_gateway_lib=debug")
        }
        #[cfg(not(debug_assertions))]
        {
            tracing_subscriber::EnvFilter::new("info")
        }
    })
}

fn ensure_log_dir(dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create log dir {}: {e}", dir.display()))?;
    Ok(dir.to_path_buf())
}

fn spawn_cleanup_task(log_dir: PathBuf, retention_days: u32) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            // First tick fires immediately, so startup gets a cleanup pass too.
            interval.tick().await;
            let log_dir_for_cleanup = log_dir.clone();
            std::mem::drop(tokio::task::spawn_blocking(move || {
                cleanup_once(&log_dir_for_cleanup, retention_days);
            }));
        }
    });
}

fn cleanup_once(log_dir: &Path, retention_days: u32) {
    let retention_days = retention_days.max(1);
    match cleanup_logs(log_dir, retention_days) {
        Ok(deleted) if deleted > 0 => {
            tracing::info!(retention_days, deleted, "cleaned up old log files");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(retention_days, "log cleanup failed: {}", err);
        }
    }
}

fn cleanup_logs(log_dir: &Path, retention_days: u32) -> Result<usize, String> {
    let retention_days = retention_days.max(1);
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(
            (retention_days as u64).saturating_mul(24 * 60 * 60),
        ))
        .unwrap_or(UNIX_EPOCH);
    cleanup_logs_before(log_dir, cutoff)
}

fn cleanup_logs_before(log_dir: &Path, cutoff: SystemTime) -> Result<usize, String> {
    let mut deleted = 0usize;
    let entries = std::fs::read_dir(log_dir).map_err(|e| format!("read_dir failed: {e}"))?;
    for entry in entries {
        let entry = match entry {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("log cleanup: read_dir entry error: {}", err);
                continue;
            }
        };

        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !name.starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(path = %path.display(), "log cleanup: metadata error: {}", err);
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let modified = meta.modified().unwrap_or(UNIX_EPOCH);
        if modified >= cutoff {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => deleted = deleted.saturating_add(1),
            Err(err) => {
                tracing::warn!(path = %path.display(), "log cleanup: remove failed: {}", err);
            }
        }
    }

    Ok(deleted)
}
