pub mod account_repo;
pub mod signin_log_repo;
pub mod system_log_repo;
pub mod task_repo;

pub use account_repo::SqliteAccountRepository;
pub use signin_log_repo::SqliteSigninLogRepository;
pub use system_log_repo::SqliteSystemLogRepository;
pub use task_repo::SqliteTaskRepository;
