use signdock_domain::shared::DomainError;
use tracing::error;

/// Translates storage-level failures into `DomainError`s with operation context.
pub struct RepositoryErrorMapper;

impl RepositoryErrorMapper {
    pub fn map_sqlx_error(e: sqlx::Error, context: &str) -> DomainError {
        match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DomainError::Conflict(format!("{}: {}", context, db_err.message()))
            }
            sqlx::Error::RowNotFound => {
                DomainError::Repository(format!("{}: row not found", context))
            }
            other => {
                error!("{} failed: {}", context, other);
                DomainError::Repository(format!("{}: {}", context, other))
            }
        }
    }

    pub fn map_json_error(e: serde_json::Error, context: &str) -> DomainError {
        DomainError::Serialization(format!("{}: {}", context, e))
    }

    /// Rejects column values that no longer parse into domain types.
    pub fn corrupt(context: &str, detail: impl std::fmt::Display) -> DomainError {
        DomainError::Repository(format!("{}: corrupt row: {}", context, detail))
    }
}
