use async_trait::async_trait;

use super::{Page, SigninLog, SigninLogQuery, SigninLogStats, SigninResult};
use crate::shared::{AccountId, DomainError};

/// Append-only store of attempt outcomes.
#[async_trait]
pub trait SigninLogRepository: Send + Sync {
    async fn append(&self, result: &SigninResult) -> Result<SigninLog, DomainError>;

    /// Newest first.
    async fn query(&self, query: &SigninLogQuery) -> Result<Page<SigninLog>, DomainError>;

    async fn stats(&self, account_id: Option<AccountId>) -> Result<SigninLogStats, DomainError>;

    /// Returns the number of rows removed.
    async fn clear(&self) -> Result<u64, DomainError>;
}
