use chrono_tz::Tz;

use signdock_domain::schedule::{ScheduledTask, TaskDefinition, TaskState};
use signdock_domain::shared::DomainError;
use signdock_infrastructure::config::{DefaultTaskSettings, Settings};

use super::timer::TaskTimer;

/// Registry-wide settings
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Zone every cron expression is evaluated in
    pub tz: Tz,
    pub default_task: DefaultTaskSettings,
}

impl RegistryConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        Ok(Self {
            tz: settings.tz()?,
            default_task: settings.default_task.clone(),
        })
    }
}

/// A registered task and, while running, its timer.
pub(super) struct TaskEntry {
    pub definition: TaskDefinition,
    pub timer: Option<Box<dyn TaskTimer>>,
    /// Identifies the timer currently allowed to fire for this entry
    pub generation: u64,
}

impl TaskEntry {
    pub fn new(definition: TaskDefinition) -> Self {
        Self {
            definition,
            timer: None,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn disarm(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.disarm();
                self.definition.next_run = None;
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> ScheduledTask {
        let state = if self.is_running() {
            TaskState::Running
        } else {
            TaskState::Stopped
        };
        ScheduledTask::from_definition(&self.definition, state)
    }
}
