mod settings;
mod timeouts;

pub use settings::{
    BatchSettings, DefaultTaskSettings, LogLevel, Settings, CONFIG_FILE_NAME, ENV_CONFIG,
    ENV_DATA_DIR, ENV_LOG_LEVEL, ENV_TIMEZONE,
};
pub use timeouts::TimeoutConfig;
