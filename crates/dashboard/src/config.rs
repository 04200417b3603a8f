//! Dashboard service configuration

use anyhow::Result;
use serde::Deserialize;

/// Service configuration, read from `FMAA_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Port the HTTP API listens on
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Name reported by the health endpoint and attached to log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Upper bound on request handling time in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_api_port() -> u16 {
    8001
}

fn default_service_name() -> String {
    "fmaa-dashboard-api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            service_name: default_service_name(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("FMAA"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
