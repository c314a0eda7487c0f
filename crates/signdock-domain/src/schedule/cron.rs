use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use croner::Cron;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::DomainError;

/// A validated five- or six-field cron expression (seconds optional).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CronExpression(String);

impl CronExpression {
    pub fn parse(expression: &str) -> Result<Self, DomainError> {
        let trimmed = expression.trim();
        let field_count = trimmed.split_whitespace().count();
        if !(5..=6).contains(&field_count) {
            return Err(DomainError::InvalidCronExpression {
                expression: expression.to_string(),
                reason: format!("expected 5 or 6 fields, found {}", field_count),
            });
        }

        compile(trimmed).map_err(|reason| DomainError::InvalidCronExpression {
            expression: expression.to_string(),
            reason,
        })?;

        Ok(Self(trimmed.to_string()))
    }

    /// Daily at `hour:minute`.
    pub fn daily_at(hour: u32, minute: u32) -> Result<Self, DomainError> {
        if hour > 23 {
            return Err(DomainError::Validation(format!(
                "hour must be between 0 and 23, got {}",
                hour
            )));
        }
        if minute > 59 {
            return Err(DomainError::Validation(format!(
                "minute must be between 0 and 59, got {}",
                minute
            )));
        }
        Self::parse(&format!("{} {} * * *", minute, hour))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First trigger instant strictly after `after`, evaluated in `tz`.
    pub fn next_after(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        let cron = compile(&self.0).ok()?;
        cron.find_next_occurrence(&after.with_timezone(&tz), false)
            .ok()
            .map(|next| next.with_timezone(&Utc))
    }
}

fn compile(expression: &str) -> Result<Cron, String> {
    Cron::new(expression)
        .with_seconds_optional()
        .parse()
        .map_err(|e| e.to_string())
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CronExpression {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CronExpression> for String {
    fn from(value: CronExpression) -> Self {
        value.0
    }
}
