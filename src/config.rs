//! Dashboard configuration, read from Rocket's figment (`Rocket.toml` and `ROCKET_*` env)

use std::time::Duration;

use rocket::figment::Figment;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Artificial delay applied by every mocked fetch
    #[serde(default = "default_mock_latency")]
    pub mock_latency_ms: u64,

    /// Rows per page in the mentions table
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum entries in a keyword input
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
}

fn default_mock_latency() -> u64 {
    400
}

fn default_page_size() -> usize {
    10
}

fn default_keyword_limit() -> usize {
    20
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            mock_latency_ms: default_mock_latency(),
            page_size: default_page_size(),
            keyword_limit: default_keyword_limit(),
        }
    }
}

impl DashboardConfig {
    /// Extract the dashboard keys from a figment, falling back to defaults on bad input
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract::<DashboardConfig>() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid dashboard configuration, using defaults");
                DashboardConfig::default()
            }
        }
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }
}
