mod cron;
mod repository;
mod task;

pub use cron::CronExpression;
pub use repository::TaskRepository;
pub use task::{NewTask, ScheduledTask, TaskDefinition, TaskPatch, TaskState, TaskStats};
