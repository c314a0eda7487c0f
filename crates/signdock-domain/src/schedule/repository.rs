use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::TaskDefinition;
use crate::shared::{DomainError, TaskId};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert or replace by id.
    async fn save(&self, task: &TaskDefinition) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<TaskDefinition>, DomainError>;

    /// Ordered by creation time.
    async fn find_all(&self) -> Result<Vec<TaskDefinition>, DomainError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: &TaskId) -> Result<bool, DomainError>;

    async fn record_run(
        &self,
        id: &TaskId,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError>;
}
