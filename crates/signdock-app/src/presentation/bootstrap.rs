use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::services::{
    AccountService, BatchExecutor, ExecutorConfig, LogQueryService, RegistryConfig,
    ScheduledBatchRunner, SigninExecutor, TaskRegistry, TokioCronTimerFactory,
};
use crate::presentation::state::{AppState, Repositories, Services};
use signdock_domain::account::AccountRepository;
use signdock_domain::schedule::TaskRepository;
use signdock_domain::shared::{Clock, SystemClock};
use signdock_domain::signin::{SigninLogRepository, SigninTransport};
use signdock_domain::system_log::SystemLogRepository;
use signdock_infrastructure::config::Settings;
use signdock_infrastructure::http::HttpClient;
use signdock_infrastructure::persistence::{
    repositories::{
        SqliteAccountRepository, SqliteSigninLogRepository, SqliteSystemLogRepository,
        SqliteTaskRepository,
    },
    Database,
};

pub async fn build_app_state(settings: Settings) -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();

    let db_path = settings.database_path();
    info!("Database path: {}", db_path.display());

    let started_at = Instant::now();
    let db = Database::new(&db_path, settings.timeouts.db_query)
        .await
        .context("Failed to open database")?;
    db.run_migrations()
        .await
        .context("Failed to run database migrations")?;
    info!(
        "✓ Database ready ({}ms)",
        started_at.elapsed().as_millis()
    );

    let state = wire(settings, Arc::new(db))?;
    info!(
        "✓ App state built ({}ms)",
        startup_started_at.elapsed().as_millis()
    );
    Ok(state)
}

pub(super) fn wire(settings: Settings, db: Arc<Database>) -> anyhow::Result<AppState> {
    let pool = db.pool();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let repositories = Repositories {
        account: Arc::new(SqliteAccountRepository::new(pool.clone())) as Arc<dyn AccountRepository>,
        signin_log: Arc::new(SqliteSigninLogRepository::new(pool.clone()))
            as Arc<dyn SigninLogRepository>,
        system_log: Arc::new(SqliteSystemLogRepository::new(pool.clone()))
            as Arc<dyn SystemLogRepository>,
        task: Arc::new(SqliteTaskRepository::new(pool)) as Arc<dyn TaskRepository>,
    };

    let transport: Arc<dyn SigninTransport> =
        Arc::new(HttpClient::new().context("Failed to build HTTP client")?);

    let executor = Arc::new(SigninExecutor::new(
        transport,
        repositories.account.clone(),
        repositories.signin_log.clone(),
        clock.clone(),
        ExecutorConfig::from(&settings),
    ));

    let batch = Arc::new(BatchExecutor::new(
        executor.clone(),
        repositories.account.clone(),
        repositories.system_log.clone(),
        &settings.batch,
    ));

    let runner = Arc::new(ScheduledBatchRunner::new(
        batch.clone(),
        repositories.account.clone(),
        repositories.system_log.clone(),
    ));

    let registry_config = RegistryConfig::from_settings(&settings)?;
    let registry = TaskRegistry::new(
        repositories.task.clone(),
        Arc::new(TokioCronTimerFactory::new(registry_config.tz, clock.clone())),
        runner,
        clock.clone(),
        registry_config,
    );

    let services = Services {
        executor,
        batch,
        accounts: Arc::new(AccountService::new(repositories.account.clone(), clock)),
        logs: Arc::new(LogQueryService::new(
            repositories.signin_log.clone(),
            repositories.system_log.clone(),
        )),
    };

    Ok(AppState {
        settings,
        db,
        repositories,
        services,
        registry,
    })
}
