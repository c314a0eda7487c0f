use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts applied to outbound requests and storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Check-in requests made by scheduled, batch and single runs
    #[serde(with = "duration_secs", rename = "signin_request_secs")]
    pub signin_request: Duration,

    /// Connectivity tests, which persist nothing
    #[serde(with = "duration_secs", rename = "connection_test_secs")]
    pub connection_test: Duration,

    /// Waiting for a pooled database connection
    #[serde(with = "duration_secs", rename = "db_query_secs")]
    pub db_query: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            signin_request: Duration::from_secs(30),
            connection_test: Duration::from_secs(10),
            db_query: Duration::from_secs(10),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
