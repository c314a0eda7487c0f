use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Account, AccountProfile};
use crate::shared::{AccountId, DomainError};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account; the store assigns the id. A duplicate name is a `Conflict`.
    async fn create(&self, profile: &AccountProfile) -> Result<Account, DomainError>;

    /// Persists the editable fields of an existing account.
    async fn update(&self, account: &Account) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    /// Accounts among `ids` that exist, in ascending id order.
    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, DomainError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError>;

    async fn find_all(&self) -> Result<Vec<Account>, DomainError>;

    async fn find_enabled(&self) -> Result<Vec<Account>, DomainError>;

    /// Returns `AccountNotFound` for an unknown id.
    async fn delete(&self, id: AccountId) -> Result<(), DomainError>;

    /// Last writer wins; concurrent runs against the same account are not serialized.
    async fn update_last_signin(
        &self,
        id: AccountId,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}
