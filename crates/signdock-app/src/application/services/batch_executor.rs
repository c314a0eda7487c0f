use futures::future::join_all;
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use signdock_domain::account::{Account, AccountRepository};
use signdock_domain::shared::{AccountId, DomainError};
use signdock_domain::signin::{BatchSummary, SigninResult};
use signdock_domain::system_log::{NewSystemLog, SystemLogCategory, SystemLogRepository};
use signdock_infrastructure::config::BatchSettings;

use super::signin_executor::SigninAttempt;

/// Batch sign-in result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSigninReport {
    /// Dispatch order, not completion order
    pub results: Vec<SigninResult>,
    pub summary: BatchSummary,
}

/// Runs attempts in fixed-size concurrent batches with a pause between batches.
pub struct BatchExecutor {
    attempt: Arc<dyn SigninAttempt>,
    account_repo: Arc<dyn AccountRepository>,
    system_logs: Arc<dyn SystemLogRepository>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchExecutor {
    pub fn new(
        attempt: Arc<dyn SigninAttempt>,
        account_repo: Arc<dyn AccountRepository>,
        system_logs: Arc<dyn SystemLogRepository>,
        settings: &BatchSettings,
    ) -> Self {
        Self {
            attempt,
            account_repo,
            system_logs,
            batch_size: settings.size.max(1),
            batch_delay: settings.delay(),
        }
    }

    #[instrument(skip(self, accounts), fields(accounts = accounts.len()))]
    pub async fn run(&self, accounts: Vec<Account>) -> BatchSigninReport {
        if accounts.is_empty() {
            info!("No accounts to sign in, skipping batch");
            return BatchSigninReport::default();
        }

        let batch_count = accounts.len().div_ceil(self.batch_size);
        info!(
            "🚀 Starting batch sign-in: {} accounts in {} batches of up to {}",
            accounts.len(),
            batch_count,
            self.batch_size
        );

        let mut results = Vec::with_capacity(accounts.len());
        for (index, batch) in accounts.chunks(self.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }

            info!("Batch {}/{}: {} accounts", index + 1, batch_count, batch.len());
            let outcomes = join_all(batch.iter().map(|account| self.attempt.execute(account))).await;
            results.extend(outcomes);
        }

        let summary = BatchSummary::from_results(&results);
        info!("🏁 Batch sign-in finished: {}", summary);

        BatchSigninReport { results, summary }
    }

    /// Runs every enabled account.
    pub async fn run_enabled(&self) -> Result<BatchSigninReport, DomainError> {
        let accounts = self.account_repo.find_enabled().await?;
        Ok(self.run(accounts).await)
    }

    /// Operator-triggered run.
    ///
    /// `None` runs every enabled account. With ids, keeps those that exist and are
    /// enabled, in the requested order; others are dropped without error.
    #[instrument(skip(self))]
    pub async fn run_selection(
        &self,
        ids: Option<Vec<AccountId>>,
    ) -> Result<BatchSigninReport, DomainError> {
        let accounts = match ids {
            None => self.account_repo.find_enabled().await?,
            Some(ids) => self.resolve_selection(&ids).await?,
        };

        let report = self.run(accounts).await;

        let entry = NewSystemLog::info(
            SystemLogCategory::Manual,
            format!("Manual batch sign-in finished: {}", report.summary),
        );
        if let Err(e) = self.system_logs.append(&entry).await {
            error!("Failed to write system log: {}", e.format_with_code());
        }

        Ok(report)
    }

    async fn resolve_selection(&self, ids: &[AccountId]) -> Result<Vec<Account>, DomainError> {
        let mut seen = HashSet::new();
        let requested: Vec<AccountId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut found = self.account_repo.find_by_ids(&requested).await?;
        found.retain(|a| a.is_enabled());

        let dropped = requested.len() - found.len();
        if dropped > 0 {
            info!("Dropped {} requested accounts (missing or disabled)", dropped);
        }

        Ok(requested
            .iter()
            .filter_map(|id| {
                found
                    .iter()
                    .position(|a| a.id() == *id)
                    .map(|pos| found.swap_remove(pos))
            })
            .collect())
    }
}
