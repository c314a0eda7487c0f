mod runner;
mod task_manager;
mod timer;
mod types;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::{error, info};

use signdock_domain::schedule::{TaskDefinition, TaskRepository};
use signdock_domain::shared::{Clock, TaskId};
use signdock_domain::system_log::SystemLogCategory;

pub use runner::{ScheduledBatchRunner, TaskRunner};
pub use timer::{FireCallback, TaskTimer, TimerFactory, TokioCronTimerFactory};
pub use types::RegistryConfig;

use types::TaskEntry;

/// Owns every scheduled task and its timer.
///
/// Cheap to clone; clones share the same registry. Built once by the composition
/// root and handed to whoever needs it.
#[derive(Clone)]
pub struct TaskRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    /// Tasks mapped by id, with their armed timers
    tasks: Mutex<HashMap<TaskId, TaskEntry>>,
    repo: Arc<dyn TaskRepository>,
    timers: Arc<dyn TimerFactory>,
    runner: Arc<dyn TaskRunner>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
    generations: AtomicU64,
}

impl TaskRegistry {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        timers: Arc<dyn TimerFactory>,
        runner: Arc<dyn TaskRunner>,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                tasks: Mutex::new(HashMap::new()),
                repo,
                timers,
                runner,
                clock,
                config,
                generations: AtomicU64::new(1),
            }),
        }
    }

    pub fn default_task_id(&self) -> TaskId {
        TaskId::from_string(&self.inner.config.default_task.id)
    }
}

impl RegistryInner {
    /// Arms a fresh timer for `entry`, replacing any previous one.
    ///
    /// Must be called with the task map locked so the swap is never observed
    /// half-done.
    fn arm(self: &Arc<Self>, entry: &mut TaskEntry, now: DateTime<Utc>) {
        if let Some(old) = entry.timer.take() {
            old.disarm();
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let weak = Arc::downgrade(self);
        let task_id = entry.definition.id.clone();

        let on_fire: FireCallback = Arc::new(move |fired_at| {
            let weak: Weak<RegistryInner> = weak.clone();
            let task_id = task_id.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_fire(&task_id, generation, fired_at).await;
                }
            }
            .boxed()
        });

        entry.timer = Some(self.timers.arm(
            &entry.definition.id,
            &entry.definition.cron_expression,
            on_fire,
        ));
        entry.generation = generation;
        entry.definition.next_run = self.next_run(&entry.definition, now);
    }

    fn next_run(&self, definition: &TaskDefinition, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        definition.cron_expression.next_after(now, self.config.tz)
    }

    async fn handle_fire(&self, task_id: &TaskId, generation: u64, fired_at: DateTime<Utc>) {
        let task = {
            let mut tasks = self.tasks.lock().await;
            match tasks.get_mut(task_id) {
                Some(entry) if entry.generation == generation && entry.is_running() => {
                    let now = self.clock.now();
                    entry.definition.last_run = Some(now);
                    entry.definition.next_run = entry
                        .definition
                        .cron_expression
                        .next_after(fired_at.max(now), self.config.tz);
                    entry.definition.clone()
                }
                _ => {
                    info!("Ignoring stale trigger for task '{}'", task_id);
                    return;
                }
            }
        };

        self.persist_run(&task).await;

        match self
            .runner
            .run(&task.id, &task.name, SystemLogCategory::Schedule)
            .await
        {
            Ok(summary) => info!("✅ Task '{}' finished: {}", task.name, summary),
            Err(e) => error!("❌ Task '{}' failed: {}", task.name, e.format_with_code()),
        }
    }

    async fn persist_run(&self, task: &TaskDefinition) {
        let Some(last_run) = task.last_run else {
            return;
        };
        if let Err(e) = self.repo.record_run(&task.id, last_run, task.next_run).await {
            error!(
                "Failed to record run of task '{}': {}",
                task.id,
                e.format_with_code()
            );
        }
    }
}
