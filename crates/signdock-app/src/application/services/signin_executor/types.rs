use serde::{Deserialize, Serialize};
use std::time::Duration;

use signdock_infrastructure::config::Settings;

/// Runtime knobs for the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub signin_timeout: Duration,
    pub test_timeout: Duration,
    /// Characters of response body kept on a result
    pub preview_limit: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            signin_timeout: Duration::from_secs(30),
            test_timeout: Duration::from_secs(10),
            preview_limit: 2000,
        }
    }
}

impl From<&Settings> for ExecutorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            signin_timeout: settings.timeouts.signin_request,
            test_timeout: settings.timeouts.connection_test,
            preview_limit: settings.response_preview_limit,
        }
    }
}

/// Outcome of a connectivity probe. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub execution_time_ms: u64,
    pub response_data: Option<String>,
    pub message: String,
}
