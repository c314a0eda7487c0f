use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::AccountId;

/// Outcome of one check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninResult {
    pub account_id: AccountId,
    /// Captured at attempt time so history survives renames and deletion.
    pub account_name: String,
    pub success: bool,
    /// `None` when no HTTP response was received.
    pub status_code: Option<u16>,
    pub message: String,
    pub response_data: Option<String>,
    pub execution_time_ms: u64,
    pub attempted_at: DateTime<Utc>,
}

/// A persisted `SigninResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninLog {
    pub id: i64,
    pub account_id: AccountId,
    pub account_name: String,
    pub success: bool,
    pub status_code: Option<u16>,
    pub message: String,
    pub response_data: Option<String>,
    pub execution_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl SigninLog {
    pub fn from_result(id: i64, result: &SigninResult) -> Self {
        Self {
            id,
            account_id: result.account_id,
            account_name: result.account_name.clone(),
            success: result.success,
            status_code: result.status_code,
            message: result.message.clone(),
            response_data: result.response_data.clone(),
            execution_time_ms: result.execution_time_ms,
            created_at: result.attempted_at,
        }
    }
}

/// Aggregate success/fail counts for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub success: usize,
    pub fail: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[SigninResult]) -> Self {
        let total = results.len();
        let success = results.iter().filter(|r| r.success).count();
        Self {
            success,
            fail: total - success,
            total,
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} total",
            self.success, self.fail, self.total
        )
    }
}
