use log::info;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use signdock_domain::shared::{AccountId, DomainError};
use signdock_domain::signin::{
    Page, Pagination, SigninLog, SigninLogQuery, SigninLogRepository, SigninLogStats,
};
use signdock_domain::system_log::{SystemLog, SystemLogQuery, SystemLogRepository};

/// Which log store to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Signin,
    System,
    All,
}

impl FromStr for LogKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signin" => Ok(LogKind::Signin),
            "system" => Ok(LogKind::System),
            "all" => Ok(LogKind::All),
            other => Err(DomainError::Validation(format!(
                "Unknown log type '{}', expected 'signin', 'system' or 'all'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearedLogs {
    pub signin: u64,
    pub system: u64,
}

/// Read and maintenance access to sign-in and system logs.
pub struct LogQueryService {
    signin_logs: Arc<dyn SigninLogRepository>,
    system_logs: Arc<dyn SystemLogRepository>,
}

impl LogQueryService {
    pub fn new(
        signin_logs: Arc<dyn SigninLogRepository>,
        system_logs: Arc<dyn SystemLogRepository>,
    ) -> Self {
        Self {
            signin_logs,
            system_logs,
        }
    }

    pub async fn signin_logs(&self, query: &SigninLogQuery) -> Result<Page<SigninLog>, DomainError> {
        query.validate()?;
        self.signin_logs.query(query).await
    }

    pub async fn system_logs(&self, query: &SystemLogQuery) -> Result<Page<SystemLog>, DomainError> {
        Pagination::new(query.pagination.page, query.pagination.limit)?;
        self.system_logs.query(query).await
    }

    pub async fn stats(&self, account_id: Option<AccountId>) -> Result<SigninLogStats, DomainError> {
        self.signin_logs.stats(account_id).await
    }

    pub async fn clear(&self, kind: LogKind) -> Result<ClearedLogs, DomainError> {
        let mut cleared = ClearedLogs::default();
        if matches!(kind, LogKind::Signin | LogKind::All) {
            cleared.signin = self.signin_logs.clear().await?;
        }
        if matches!(kind, LogKind::System | LogKind::All) {
            cleared.system = self.system_logs.clear().await?;
        }

        info!(
            "🧹 Cleared {} sign-in logs and {} system logs",
            cleared.signin, cleared.system
        );
        Ok(cleared)
    }
}
