use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;
use crate::signin::{Page, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemLogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemLogCategory {
    /// Timer-triggered runs.
    Schedule,
    /// Operator-triggered batch runs.
    Manual,
    System,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(DomainError::Validation(format!(
                        "Unknown {} '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

str_enum!(SystemLogLevel {
    Info => "info",
    Warn => "warn",
    Error => "error",
});

str_enum!(SystemLogCategory {
    Schedule => "schedule",
    Manual => "manual",
    System => "system",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSystemLog {
    pub level: SystemLogLevel,
    pub category: SystemLogCategory,
    pub message: String,
}

impl NewSystemLog {
    pub fn info(category: SystemLogCategory, message: impl Into<String>) -> Self {
        Self {
            level: SystemLogLevel::Info,
            category,
            message: message.into(),
        }
    }

    pub fn warn(category: SystemLogCategory, message: impl Into<String>) -> Self {
        Self {
            level: SystemLogLevel::Warn,
            category,
            message: message.into(),
        }
    }

    pub fn error(category: SystemLogCategory, message: impl Into<String>) -> Self {
        Self {
            level: SystemLogLevel::Error,
            category,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemLog {
    pub id: i64,
    pub level: SystemLogLevel,
    pub category: SystemLogCategory,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemLogQuery {
    pub level: Option<SystemLogLevel>,
    pub category: Option<SystemLogCategory>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[async_trait]
pub trait SystemLogRepository: Send + Sync {
    async fn append(&self, entry: &NewSystemLog) -> Result<SystemLog, DomainError>;

    /// Newest first.
    async fn query(&self, query: &SystemLogQuery) -> Result<Page<SystemLog>, DomainError>;

    async fn clear(&self) -> Result<u64, DomainError>;
}
