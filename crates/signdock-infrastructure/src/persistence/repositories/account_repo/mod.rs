mod mutations;
mod queries;
mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use signdock_domain::account::{Account, AccountProfile, AccountRepository};
use signdock_domain::shared::{AccountId, DomainError};

pub struct SqliteAccountRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteAccountRepository {
    const SELECT_QUERY: &'static str = r#"
            SELECT
                id, name, signin_url, method, cookies, headers, request_body,
                success_keyword, description, enabled, last_signin_at,
                last_signin_status, created_at, updated_at
            FROM accounts
        "#;

    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, profile: &AccountProfile) -> Result<Account, DomainError> {
        self.create_impl(profile).await
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        self.update_impl(account).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        self.find_by_id_impl(id).await
    }

    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, DomainError> {
        self.find_by_ids_impl(ids).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        self.find_by_name_impl(name).await
    }

    async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        self.find_all_impl().await
    }

    async fn find_enabled(&self) -> Result<Vec<Account>, DomainError> {
        self.find_enabled_impl().await
    }

    async fn delete(&self, id: AccountId) -> Result<(), DomainError> {
        self.delete_impl(id).await
    }

    async fn update_last_signin(
        &self,
        id: AccountId,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.update_last_signin_impl(id, success, at).await
    }
}
