use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shared::{AccountId, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Failed,
}

impl LogStatus {
    pub fn as_bool(&self) -> bool {
        matches!(self, LogStatus::Success)
    }
}

impl FromStr for LogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(LogStatus::Success),
            "failed" => Ok(LogStatus::Failed),
            other => Err(DomainError::Validation(format!(
                "Unknown log status '{}', expected 'success' or 'failed'",
                other
            ))),
        }
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::InvalidInput("page must be at least 1".into()));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Filters for reading signin logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninLogQuery {
    pub account_id: Option<AccountId>,
    pub status: Option<LogStatus>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl SigninLogQuery {
    pub fn validate(&self) -> Result<(), DomainError> {
        Pagination::new(self.pagination.page, self.pagination.limit)?;
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(DomainError::InvalidInput(
                    "start must not be after end".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        }
    }

    pub fn pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SigninLogStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    /// Percentage, two decimals.
    pub success_rate: f64,
}

impl SigninLogStats {
    pub fn new(total: u64, success: u64) -> Self {
        let success_rate = if total == 0 {
            0.0
        } else {
            ((success as f64 / total as f64) * 10_000.0).round() / 100.0
        };
        Self {
            total,
            success,
            failed: total.saturating_sub(success),
            success_rate,
        }
    }
}
