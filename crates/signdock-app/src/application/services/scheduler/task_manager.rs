use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

use signdock_domain::schedule::{
    CronExpression, NewTask, ScheduledTask, TaskDefinition, TaskPatch, TaskStats,
};
use signdock_domain::shared::{DomainError, TaskId};
use signdock_domain::signin::BatchSummary;
use signdock_domain::system_log::SystemLogCategory;

use super::types::TaskEntry;
use super::TaskRegistry;

impl TaskRegistry {
    /// Registers a new task; armed immediately when enabled.
    #[instrument(skip(self, task), fields(name = %task.name))]
    pub async fn create_task(&self, task: NewTask) -> Result<ScheduledTask, DomainError> {
        let cron = CronExpression::parse(&task.cron_expression)?;
        let id = task.id.unwrap_or_default();
        let now = self.inner.clock.now();
        let definition = TaskDefinition::new(id, task.name, cron, task.enabled, now)?;

        let mut tasks = self.inner.tasks.lock().await;
        if tasks.contains_key(&definition.id) {
            return Err(DomainError::Conflict(format!(
                "Task '{}' already exists",
                definition.id
            )));
        }

        let view = self.insert_locked(&mut tasks, definition).await?;
        info!("✅ Task '{}' created ({:?})", view.id, view.state);
        Ok(view)
    }

    /// Arms a stopped task. No-op when already running.
    ///
    /// The store is written first; on failure the task is left as it was.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn start_task(&self, id: &TaskId) -> Result<ScheduledTask, DomainError> {
        let now = self.inner.clock.now();
        let mut tasks = self.inner.tasks.lock().await;
        let entry = tasks
            .get_mut(id)
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))?;

        if entry.is_running() {
            return Ok(entry.view());
        }

        let mut updated = entry.definition.clone();
        updated.enabled = true;
        updated.next_run = self.inner.next_run(&updated, now);
        updated.updated_at = now;
        self.inner.repo.save(&updated).await?;

        entry.definition = updated;
        self.inner.arm(entry, now);

        info!("✅ Task '{}' started", id);
        Ok(entry.view())
    }

    /// Disarms a running task and marks it disabled. No-op when already stopped.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn stop_task(&self, id: &TaskId) -> Result<ScheduledTask, DomainError> {
        let now = self.inner.clock.now();
        let mut tasks = self.inner.tasks.lock().await;
        let entry = tasks
            .get_mut(id)
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))?;

        if !entry.is_running() && !entry.definition.enabled {
            return Ok(entry.view());
        }

        let mut updated = entry.definition.clone();
        updated.enabled = false;
        updated.next_run = None;
        updated.updated_at = now;
        self.inner.repo.save(&updated).await?;

        entry.disarm();
        entry.definition = updated;

        info!("🛑 Task '{}' stopped", id);
        Ok(entry.view())
    }

    /// Applies a partial update. A new cron expression on a running task swaps
    /// the timer under the registry lock.
    #[instrument(skip(self, patch), fields(task_id = %id))]
    pub async fn update_task(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> Result<ScheduledTask, DomainError> {
        let cron = patch
            .cron_expression
            .as_deref()
            .map(CronExpression::parse)
            .transpose()?;
        let name = match patch.name {
            Some(name) if name.trim().is_empty() => {
                return Err(DomainError::Validation("Task name cannot be empty".into()))
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };

        let now = self.inner.clock.now();
        let mut tasks = self.inner.tasks.lock().await;
        let entry = tasks
            .get_mut(id)
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))?;

        let was_running = entry.is_running();
        let mut updated = entry.definition.clone();
        if let Some(name) = name {
            updated.name = name;
        }

        let mut rescheduled = false;
        if let Some(cron) = cron {
            rescheduled = cron != updated.cron_expression;
            updated.cron_expression = cron;
        }

        let keep_running = patch.enabled.unwrap_or(was_running);
        if let Some(enabled) = patch.enabled {
            updated.enabled = enabled;
        }

        let rearm = keep_running && (!was_running || rescheduled);
        if rearm {
            updated.next_run = self.inner.next_run(&updated, now);
        } else if !keep_running {
            updated.next_run = None;
        }
        updated.updated_at = now;
        self.inner.repo.save(&updated).await?;

        entry.definition = updated;
        if rearm {
            self.inner.arm(entry, now);
            if was_running {
                info!(
                    "🔄 Task '{}' rescheduled to {}",
                    id, entry.definition.cron_expression
                );
            }
        } else if !keep_running {
            entry.disarm();
        }

        Ok(entry.view())
    }

    /// Removes the task from the store, then disarms and drops it.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), DomainError> {
        let mut tasks = self.inner.tasks.lock().await;
        if !tasks.contains_key(id) {
            return Err(DomainError::TaskNotFound(id.to_string()));
        }

        self.inner.repo.delete(id).await?;
        if let Some(mut entry) = tasks.remove(id) {
            entry.disarm();
        }

        info!("⏹️  Task '{}' deleted", id);
        Ok(())
    }

    pub async fn get_task(&self, id: &TaskId) -> Result<ScheduledTask, DomainError> {
        let tasks = self.inner.tasks.lock().await;
        tasks
            .get(id)
            .map(TaskEntry::view)
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))
    }

    /// Oldest first.
    pub async fn list_tasks(&self) -> Vec<ScheduledTask> {
        let tasks = self.inner.tasks.lock().await;
        let mut entries: Vec<&TaskEntry> = tasks.values().collect();
        entries.sort_by(|a, b| {
            a.definition
                .created_at
                .cmp(&b.definition.created_at)
                .then_with(|| a.definition.id.cmp(&b.definition.id))
        });
        entries.into_iter().map(TaskEntry::view).collect()
    }

    pub async fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.list_tasks().await)
    }

    /// Runs the task body inline, outside its schedule.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn run_task_now(&self, id: &TaskId) -> Result<BatchSummary, DomainError> {
        let task = {
            let mut tasks = self.inner.tasks.lock().await;
            let entry = tasks
                .get_mut(id)
                .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))?;
            entry.definition.last_run = Some(self.inner.clock.now());
            entry.definition.clone()
        };

        self.inner.persist_run(&task).await;

        info!("▶️  Running task '{}' now", task.name);
        self.inner
            .runner
            .run(&task.id, &task.name, SystemLogCategory::Manual)
            .await
    }

    /// Loads persisted tasks, seeds the default task and arms everything enabled.
    ///
    /// Safe to call more than once.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), DomainError> {
        let definitions = self.inner.repo.find_all().await?;
        {
            let mut tasks = self.inner.tasks.lock().await;
            for definition in definitions {
                tasks
                    .entry(definition.id.clone())
                    .or_insert_with(|| TaskEntry::new(definition));
            }
        }

        self.ensure_default_task().await?;
        let armed = self.start_all_tasks().await;

        info!("✅ Task registry initialized, {} tasks armed", armed);
        Ok(())
    }

    /// Creates the default daily task unless a task with its id already exists.
    /// Returns whether it was created.
    pub async fn ensure_default_task(&self) -> Result<bool, DomainError> {
        let defaults = &self.inner.config.default_task;
        let id = self.default_task_id();

        let mut tasks = self.inner.tasks.lock().await;
        if tasks.contains_key(&id) {
            return Ok(false);
        }

        if let Some(existing) = self.inner.repo.find_by_id(&id).await? {
            tasks.insert(id, TaskEntry::new(existing));
            return Ok(false);
        }

        let definition = TaskDefinition::new(
            id,
            defaults.name.clone(),
            CronExpression::parse(&defaults.cron_expression)?,
            defaults.enabled,
            self.inner.clock.now(),
        )?;
        let view = self.insert_locked(&mut tasks, definition).await?;

        info!(
            "➕ Default task '{}' created ({})",
            view.name, view.cron_expression
        );
        Ok(true)
    }

    /// Arms every enabled task that is not already running. Returns how many
    /// timers were armed.
    pub async fn start_all_tasks(&self) -> usize {
        let now = self.inner.clock.now();
        let mut tasks = self.inner.tasks.lock().await;
        let mut armed = 0;

        for entry in tasks.values_mut() {
            if !entry.definition.enabled || entry.is_running() {
                continue;
            }
            self.inner.arm(entry, now);
            armed += 1;

            if let Err(e) = self.inner.repo.save(&entry.definition).await {
                warn!(
                    "Failed to persist next run of task '{}': {}",
                    entry.definition.id,
                    e.format_with_code()
                );
            }
        }

        armed
    }

    /// Disarms every timer without touching the persisted `enabled` flags.
    pub async fn stop_all_tasks(&self) -> usize {
        let mut tasks = self.inner.tasks.lock().await;
        let mut stopped = 0;
        for entry in tasks.values_mut() {
            if entry.disarm() {
                stopped += 1;
            }
        }
        info!("🛑 Stopped {} scheduled tasks", stopped);
        stopped
    }

    /// Moves the default task to a new daily time.
    pub async fn update_default_signin_time(
        &self,
        hour: u32,
        minute: u32,
    ) -> Result<ScheduledTask, DomainError> {
        let cron = CronExpression::daily_at(hour, minute)?;
        self.ensure_default_task().await?;

        self.update_task(
            &self.default_task_id(),
            TaskPatch {
                cron_expression: Some(cron.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    async fn insert_locked(
        &self,
        tasks: &mut HashMap<TaskId, TaskEntry>,
        definition: TaskDefinition,
    ) -> Result<ScheduledTask, DomainError> {
        let now = definition.created_at;
        let mut entry = TaskEntry::new(definition);
        if entry.definition.enabled {
            self.inner.arm(&mut entry, now);
        }

        if let Err(e) = self.inner.repo.save(&entry.definition).await {
            entry.disarm();
            error!(
                "Failed to persist task '{}': {}",
                entry.definition.id,
                e.format_with_code()
            );
            return Err(e);
        }

        let view = entry.view();
        tasks.insert(entry.definition.id.clone(), entry);
        Ok(view)
    }
}
