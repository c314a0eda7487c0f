// Domain layer - Pure business logic
// No dependencies on infrastructure or application layers

pub mod account;
pub mod schedule;
pub mod shared;
pub mod signin;
pub mod system_log;

// Re-exports for convenience
pub use shared::{AccountId, DomainError, TaskId};
