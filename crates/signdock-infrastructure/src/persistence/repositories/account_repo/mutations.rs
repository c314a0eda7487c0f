use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::info;

use super::types::AccountRow;
use crate::persistence::RepositoryErrorMapper;
use signdock_domain::account::{Account, AccountProfile};
use signdock_domain::shared::{AccountId, DomainError};

impl super::SqliteAccountRepository {
    pub(super) async fn create_impl(
        &self,
        profile: &AccountProfile,
    ) -> Result<Account, DomainError> {
        let start = Instant::now();
        let now = Utc::now();

        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts (
                name, signin_url, method, cookies, headers, request_body,
                success_keyword, description, enabled, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING
                id, name, signin_url, method, cookies, headers, request_body,
                success_keyword, description, enabled, last_signin_at,
                last_signin_status, created_at, updated_at
        "#,
        )
        .bind(&profile.name)
        .bind(&profile.signin_url)
        .bind(profile.method.as_str())
        .bind(&profile.cookies)
        .bind(profile.headers.as_deref())
        .bind(profile.request_body.as_deref())
        .bind(profile.success_keyword.as_deref())
        .bind(profile.description.as_deref())
        .bind(profile.enabled)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Create account"))?;

        info!(
            "📊 create({}): {:.2}ms, id: {}",
            profile.name,
            start.elapsed().as_secs_f64() * 1000.0,
            row.id
        );

        row.to_account()
    }

    pub(super) async fn update_impl(&self, account: &Account) -> Result<(), DomainError> {
        let profile = account.profile();

        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                name = ?2,
                signin_url = ?3,
                method = ?4,
                cookies = ?5,
                headers = ?6,
                request_body = ?7,
                success_keyword = ?8,
                description = ?9,
                enabled = ?10,
                updated_at = ?11
            WHERE id = ?1
        "#,
        )
        .bind(account.id().value())
        .bind(&profile.name)
        .bind(&profile.signin_url)
        .bind(profile.method.as_str())
        .bind(&profile.cookies)
        .bind(profile.headers.as_deref())
        .bind(profile.request_body.as_deref())
        .bind(profile.success_keyword.as_deref())
        .bind(profile.description.as_deref())
        .bind(profile.enabled)
        .bind(account.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Update account"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(account.id().to_string()));
        }
        Ok(())
    }

    pub(super) async fn delete_impl(&self, id: AccountId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Delete account"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }

    pub(super) async fn update_last_signin_impl(
        &self,
        id: AccountId,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET last_signin_at = ?2, last_signin_status = ?3, updated_at = ?2
            WHERE id = ?1
        "#,
        )
        .bind(id.value())
        .bind(at)
        .bind(success)
        .execute(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Update last signin"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }
}
