use std::sync::Arc;

use crate::application::services::{
    AccountService, BatchExecutor, LogQueryService, SigninExecutor, TaskRegistry,
};
use signdock_domain::account::AccountRepository;
use signdock_domain::schedule::TaskRepository;
use signdock_domain::signin::SigninLogRepository;
use signdock_domain::system_log::SystemLogRepository;
use signdock_infrastructure::config::Settings;
use signdock_infrastructure::persistence::Database;

pub struct Repositories {
    pub account: Arc<dyn AccountRepository>,
    pub signin_log: Arc<dyn SigninLogRepository>,
    pub system_log: Arc<dyn SystemLogRepository>,
    pub task: Arc<dyn TaskRepository>,
}

pub struct Services {
    pub executor: Arc<SigninExecutor>,
    pub batch: Arc<BatchExecutor>,
    pub accounts: Arc<AccountService>,
    pub logs: Arc<LogQueryService>,
}

/// Everything the process needs, wired once at startup.
pub struct AppState {
    pub settings: Settings,
    pub db: Arc<Database>,
    pub repositories: Repositories,
    pub services: Services,
    pub registry: TaskRegistry,
}

impl AppState {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::build_app_state(settings).await
    }

    /// Wires the state over an already opened database.
    pub fn with_database(settings: Settings, db: Database) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::wire(settings, Arc::new(db))
    }

    /// Stops every timer and closes the pool.
    pub async fn shutdown(&self) {
        self.registry.stop_all_tasks().await;
        self.db.close().await;
    }
}
