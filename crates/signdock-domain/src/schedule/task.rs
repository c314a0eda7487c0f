use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CronExpression;
use crate::shared::{DomainError, TaskId};

/// Persisted definition of a cron-triggered task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub name: String,
    pub cron_expression: CronExpression,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDefinition {
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        cron_expression: CronExpression,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("Task name cannot be empty".into()));
        }
        if id.as_str().trim().is_empty() {
            return Err(DomainError::Validation("Task id cannot be empty".into()));
        }

        Ok(Self {
            id,
            name,
            cron_expression,
            enabled,
            last_run: None,
            next_run: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Stopped,
}

/// Registry view of a task: its definition plus whether a timer is armed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: String,
    pub cron_expression: String,
    pub enabled: bool,
    pub state: TaskState,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    pub fn from_definition(definition: &TaskDefinition, state: TaskState) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            cron_expression: definition.cron_expression.to_string(),
            enabled: definition.enabled,
            state,
            last_run: definition.last_run,
            next_run: definition.next_run,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Generated when absent.
    pub id: Option<TaskId>,
    pub name: String,
    pub cron_expression: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub cron_expression: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub running: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[ScheduledTask]) -> Self {
        let enabled = tasks.iter().filter(|t| t.enabled).count();
        Self {
            total: tasks.len(),
            enabled,
            disabled: tasks.len() - enabled,
            running: tasks.iter().filter(|t| t.is_running()).count(),
        }
    }
}
