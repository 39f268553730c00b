mod downstream;
mod envelope;
mod errors;
mod events;
mod manager;
mod routes;
mod submit_workflow;
mod timesheet;
mod timesheet_records;
mod util;

#[cfg(test)]
mod test_support;

pub use manager::GatewayManager;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub running: bool,
    pub port: Option<u16>,
    pub base_url: Option<String>,
}
