use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::TimeoutConfig;
use signdock_domain::schedule::CronExpression;
use signdock_domain::shared::DomainError;

pub const CONFIG_FILE_NAME: &str = "signdock.json";
pub const ENV_CONFIG: &str = "SIGNDOCK_CONFIG";
pub const ENV_DATA_DIR: &str = "SIGNDOCK_DATA_DIR";
pub const ENV_TIMEZONE: &str = "SIGNDOCK_TIMEZONE";
pub const ENV_LOG_LEVEL: &str = "SIGNDOCK_LOG_LEVEL";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Accounts dispatched concurrently per batch
    pub size: usize,
    /// Pause between consecutive batches
    pub delay_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            size: 3,
            delay_ms: 1000,
        }
    }
}

impl BatchSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// The task seeded on first start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTaskSettings {
    pub id: String,
    pub name: String,
    pub cron_expression: String,
    pub enabled: bool,
}

impl Default for DefaultTaskSettings {
    fn default() -> Self {
        Self {
            id: "daily-signin".to_string(),
            name: "Daily automatic sign-in".to_string(),
            cron_expression: "0 9 * * *".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_file: String,
    /// Defaults to `<data_dir>/logs`
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    /// IANA zone used to evaluate every cron expression
    pub timezone: String,
    pub batch: BatchSettings,
    pub default_task: DefaultTaskSettings,
    /// Characters of response body kept in results and logs
    pub response_preview_limit: usize,
    pub timeouts: TimeoutConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: "signdock.db".to_string(),
            log_dir: None,
            log_level: None,
            timezone: "Asia/Shanghai".to_string(),
            batch: BatchSettings::default(),
            default_task: DefaultTaskSettings::default(),
            response_preview_limit: 2000,
            timeouts: TimeoutConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("signdock")
}

impl Settings {
    /// Resolves the config file (`path`, then `SIGNDOCK_CONFIG`, then the default data
    /// directory), loads it, applies environment overrides and validates the result.
    ///
    /// A missing file is created with defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .unwrap_or_else(|| default_data_dir().join(CONFIG_FILE_NAME));

        let mut settings = Self::load_file(&path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;

        info!("📁 Settings loaded from: {}", path.display());
        Ok(settings)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            let settings = Self::default();
            settings.save(path)?;
            info!("📝 Wrote default settings to {}", path.display());
            Ok(settings)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(tz) = lookup(ENV_TIMEZONE).filter(|v| !v.is_empty()) {
            self.timezone = tz;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).and_then(|v| LogLevel::parse(&v)) {
            self.log_level = Some(level);
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.tz()?;
        CronExpression::parse(&self.default_task.cron_expression)?;

        if self.batch.size == 0 {
            return Err(DomainError::Validation(
                "batch.size must be at least 1".to_string(),
            ));
        }
        if self.response_preview_limit == 0 {
            return Err(DomainError::Validation(
                "response_preview_limit must be at least 1".to_string(),
            ));
        }
        if self.default_task.id.trim().is_empty() {
            return Err(DomainError::Validation(
                "default_task.id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, DomainError> {
        self.timezone.parse::<Tz>().map_err(|_| {
            DomainError::Validation(format!("Unknown timezone '{}'", self.timezone))
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}
