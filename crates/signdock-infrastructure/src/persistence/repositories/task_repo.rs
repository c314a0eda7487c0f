use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use tracing::debug;

use crate::persistence::RepositoryErrorMapper;
use signdock_domain::schedule::{CronExpression, TaskDefinition, TaskRepository};
use signdock_domain::shared::{DomainError, TaskId};

#[derive(FromRow)]
struct TaskRow {
    id: String,
    name: String,
    cron_expression: String,
    enabled: bool,
    last_run: Option<DateTime<Utc>>,
    next_run: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    #[allow(clippy::wrong_self_convention)]
    fn to_definition(self) -> Result<TaskDefinition, DomainError> {
        let cron_expression = CronExpression::parse(&self.cron_expression)
            .map_err(|e| RepositoryErrorMapper::corrupt("schedule_tasks.cron_expression", e))?;

        Ok(TaskDefinition {
            id: TaskId::from_string(&self.id),
            name: self.name,
            cron_expression,
            enabled: self.enabled,
            last_run: self.last_run,
            next_run: self.next_run,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SqliteTaskRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteTaskRepository {
    const SELECT_QUERY: &'static str = r#"
            SELECT id, name, cron_expression, enabled, last_run, next_run, created_at, updated_at
            FROM schedule_tasks
        "#;

    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn save(&self, task: &TaskDefinition) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO schedule_tasks (
                id, name, cron_expression, enabled, last_run, next_run, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = ?2,
                cron_expression = ?3,
                enabled = ?4,
                last_run = ?5,
                next_run = ?6,
                updated_at = ?8
        "#,
        )
        .bind(task.id.as_str())
        .bind(&task.name)
        .bind(task.cron_expression.as_str())
        .bind(task.enabled)
        .bind(task.last_run)
        .bind(task.next_run)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save task"))?;

        debug!("Saved task {} ({})", task.id, task.cron_expression);
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<TaskDefinition>, DomainError> {
        let query = format!("{} WHERE id = ?1", Self::SELECT_QUERY);

        let row: Option<TaskRow> = sqlx::query_as(&query)
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find task by ID"))?;

        row.map(TaskRow::to_definition).transpose()
    }

    async fn find_all(&self) -> Result<Vec<TaskDefinition>, DomainError> {
        let query = format!("{} ORDER BY created_at ASC, id ASC", Self::SELECT_QUERY);

        let rows: Vec<TaskRow> = sqlx::query_as(&query)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find all tasks"))?;

        rows.into_iter().map(TaskRow::to_definition).collect()
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM schedule_tasks WHERE id = ?1")
            .bind(id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Delete task"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_run(
        &self,
        id: &TaskId,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE schedule_tasks SET last_run = ?2, next_run = ?3 WHERE id = ?1")
            .bind(id.as_str())
            .bind(last_run)
            .bind(next_run)
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Record task run"))?;
        Ok(())
    }
}
