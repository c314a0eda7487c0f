use anyhow::Context;

use signdock_infrastructure::config::Settings;
use signdock_lib::presentation::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load(None).context("Failed to load settings")?;

    let log_dir = settings.log_dir();
    let level = settings.log_level.map(|l| l.as_str());
    match signdock_infrastructure::logging::init_logger(log_dir.clone(), level) {
        Ok(_) => {
            tracing::info!("🚀 SignDock starting...");
            tracing::info!("📝 File logging initialized at: {}", log_dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .try_init();
        }
    }

    let state = match AppState::build(settings).await {
        Ok(state) => {
            tracing::info!("✅ App state initialized successfully");
            state
        }
        Err(e) => {
            tracing::error!("❌ Failed to initialize app state: {:#}", e);
            return Err(e);
        }
    };

    state
        .registry
        .initialize()
        .await
        .context("Failed to start scheduled tasks")?;

    for task in state.registry.list_tasks().await {
        tracing::info!(
            "⏰ Task '{}' [{}] {:?}, next run: {}",
            task.name,
            task.cron_expression,
            task.state,
            task.next_run
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    wait_for_shutdown().await;

    tracing::info!("🛑 Shutting down...");
    state.shutdown().await;
    tracing::info!("👋 SignDock stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Failed to listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
