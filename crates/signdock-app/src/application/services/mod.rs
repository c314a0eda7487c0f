mod account_service;
mod batch_executor;
mod log_query_service;
mod scheduler;
mod signin_executor;

pub use account_service::{AccountService, SigninStatusOverview};
pub use batch_executor::{BatchExecutor, BatchSigninReport};
pub use log_query_service::{ClearedLogs, LogKind, LogQueryService};
pub use scheduler::{
    FireCallback, RegistryConfig, ScheduledBatchRunner, TaskRegistry, TaskRunner, TaskTimer,
    TimerFactory, TokioCronTimerFactory,
};
pub use signin_executor::{ConnectionTestResult, ExecutorConfig, SigninAttempt, SigninExecutor};
