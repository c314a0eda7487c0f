use serde::{Deserialize, Serialize};

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    AccountNotFound = 2001,
    TaskNotFound = 2002,

    // Business Logic (3xxx)
    AccountDisabled = 3001,
    Conflict = 3002,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    SerializationError = 4002,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    NetworkError = 5002,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
    InvalidCronExpression = 6003,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::AccountNotFound
            | ErrorCode::TaskNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput
            | ErrorCode::InvalidCronExpression => ErrorSeverity::Info,

            ErrorCode::AccountDisabled | ErrorCode::Conflict | ErrorCode::NetworkError => {
                ErrorSeverity::Warning
            }

            ErrorCode::RepositoryError
            | ErrorCode::SerializationError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Transport failures may succeed on the next attempt; nothing else does.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Account is disabled: {0}")]
    AccountDisabled(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::InvalidCronExpression { .. } => ErrorCode::InvalidCronExpression,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            DomainError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            DomainError::Conflict(_) => ErrorCode::Conflict,
            DomainError::AccountDisabled(_) => ErrorCode::AccountDisabled,
            DomainError::Transport(_) => ErrorCode::NetworkError,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::InvalidCronExpression { reason, .. } => reason,
            DomainError::Validation(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::AccountNotFound(msg)
            | DomainError::TaskNotFound(msg)
            | DomainError::Conflict(msg)
            | DomainError::AccountDisabled(msg)
            | DomainError::Transport(msg)
            | DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Serialization(msg) => msg,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Caller-side mistakes (bad input, unknown ids) as opposed to operational failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self.code().code() / 1000, 2 | 3 | 6)
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serialization(e.to_string())
    }
}
