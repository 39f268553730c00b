//! Usage: Gateway settings (JSON file, every field optional).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_PATH_ENV: &str = "TIMESHEET_GATEWAY_SETTINGS";

pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_GATEWAY_PORT: u16 = 5001;
pub const DEFAULT_DOWNSTREAM_BASE_URL: &str =
    "https://ifyxhjgdgl.execute-api.us-west-2.amazonaws.com/test";
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub listen_host: String,
    pub port: u16,
    pub downstream_base_url: String,
    /// 0 disables the explicit timeout; the transport default applies.
    pub downstream_timeout_seconds: u32,
    pub log_dir: Option<PathBuf>,
    pub log_retention_days: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            downstream_base_url: DEFAULT_DOWNSTREAM_BASE_URL.to_string(),
            downstream_timeout_seconds: 0,
            log_dir: None,
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

pub fn path_from_env() -> Option<PathBuf> {
    std::env::var_os(SETTINGS_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn read(path: Option<&Path>) -> Result<GatewaySettings, String> {
    let Some(path) = path else {
        return Ok(GatewaySettings::default());
    };

    if !path.exists() {
        return Ok(GatewaySettings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("SETTINGS_READ: failed to read {}: {e}", path.display()))?;

    parse(&content)
}

pub(crate) fn parse(content: &str) -> Result<GatewaySettings, String> {
    let settings: GatewaySettings = serde_json::from_str(content)
        .map_err(|e| format!("SETTINGS_PARSE: invalid settings json: {e}"))?;
    validate(settings)
}

fn validate(mut settings: GatewaySettings) -> Result<GatewaySettings, String> {
    if settings.port == 0 {
        return Err("SETTINGS_INVALID: port must be > 0".to_string());
    }

    let base_url = settings.downstream_base_url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(base_url)
        .map_err(|e| format!("SETTINGS_INVALID: downstream_base_url: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!(
            "SETTINGS_INVALID: downstream_base_url must be http(s), got {}",
            parsed.scheme()
        ));
    }
    settings.downstream_base_url = base_url.to_string();

    settings.listen_host = settings.listen_host.trim().to_string();
    if settings.listen_host.is_empty() {
        settings.listen_host = DEFAULT_LISTEN_HOST.to_string();
    }

    Ok(settings)
}
