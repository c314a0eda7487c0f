use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use signdock_domain::account::AccountRepository;
use signdock_domain::shared::{DomainError, TaskId};
use signdock_domain::signin::BatchSummary;
use signdock_domain::system_log::{NewSystemLog, SystemLogCategory, SystemLogRepository};

use crate::application::services::BatchExecutor;

/// The body of a scheduled task.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(
        &self,
        task_id: &TaskId,
        task_name: &str,
        category: SystemLogCategory,
    ) -> Result<BatchSummary, DomainError>;
}

/// Signs in every enabled account and records the run in the system log.
pub struct ScheduledBatchRunner {
    batch: Arc<BatchExecutor>,
    account_repo: Arc<dyn AccountRepository>,
    system_logs: Arc<dyn SystemLogRepository>,
}

impl ScheduledBatchRunner {
    pub fn new(
        batch: Arc<BatchExecutor>,
        account_repo: Arc<dyn AccountRepository>,
        system_logs: Arc<dyn SystemLogRepository>,
    ) -> Self {
        Self {
            batch,
            account_repo,
            system_logs,
        }
    }

    async fn record(&self, entry: NewSystemLog) {
        if let Err(e) = self.system_logs.append(&entry).await {
            error!("Failed to write system log: {}", e.format_with_code());
        }
    }
}

#[async_trait]
impl TaskRunner for ScheduledBatchRunner {
    async fn run(
        &self,
        task_id: &TaskId,
        task_name: &str,
        category: SystemLogCategory,
    ) -> Result<BatchSummary, DomainError> {
        info!("▶️  Running task '{}' ({})", task_name, task_id);
        self.record(NewSystemLog::info(
            category,
            format!("Task '{}' started", task_name),
        ))
        .await;

        let accounts = match self.account_repo.find_enabled().await {
            Ok(accounts) => accounts,
            Err(e) => {
                self.record(NewSystemLog::error(
                    category,
                    format!("Task '{}' failed: {}", task_name, e),
                ))
                .await;
                return Err(e);
            }
        };

        if accounts.is_empty() {
            warn!("Task '{}' skipped: no enabled accounts", task_name);
            self.record(NewSystemLog::warn(
                category,
                format!("Task '{}' skipped: no enabled accounts", task_name),
            ))
            .await;
            return Ok(BatchSummary::default());
        }

        let report = self.batch.run(accounts).await;

        self.record(NewSystemLog::info(
            category,
            format!("Task '{}' finished: {}", task_name, report.summary),
        ))
        .await;

        Ok(report.summary)
    }
}
