use std::time::Instant;
use tracing::{info, warn};

use super::types::AccountRow;
use crate::persistence::RepositoryErrorMapper;
use signdock_domain::account::Account;
use signdock_domain::shared::{AccountId, DomainError};

impl super::SqliteAccountRepository {
    pub(super) async fn find_by_id_impl(
        &self,
        id: AccountId,
    ) -> Result<Option<Account>, DomainError> {
        let start = Instant::now();

        let query = format!(
            r#"
            {}
            WHERE id = ?1
        "#,
            Self::SELECT_QUERY
        );

        let row: Option<AccountRow> = sqlx::query_as(&query)
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find account by ID"))?;

        info!(
            "📊 find_by_id({}): {:.2}ms, found: {}",
            id,
            start.elapsed().as_secs_f64() * 1000.0,
            row.is_some()
        );

        row.map(AccountRow::to_account).transpose()
    }

    pub(super) async fn find_by_ids_impl(
        &self,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(",");

        let query = format!(
            r#"
            {}
            WHERE id IN ({})
            ORDER BY id ASC
        "#,
            Self::SELECT_QUERY,
            placeholders
        );

        let mut query_builder = sqlx::query_as::<_, AccountRow>(&query);
        for id in ids {
            query_builder = query_builder.bind(id.value());
        }

        let rows: Vec<AccountRow> = query_builder
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find accounts by IDs"))?;

        info!(
            "📊 find_by_ids({} ids): {:.2}ms, found: {} accounts",
            ids.len(),
            start.elapsed().as_secs_f64() * 1000.0,
            rows.len()
        );

        rows.into_iter().map(AccountRow::to_account).collect()
    }

    pub(super) async fn find_by_name_impl(
        &self,
        name: &str,
    ) -> Result<Option<Account>, DomainError> {
        let query = format!(
            r#"
            {}
            WHERE name = ?1
        "#,
            Self::SELECT_QUERY
        );

        let row: Option<AccountRow> = sqlx::query_as(&query)
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find account by name"))?;

        row.map(AccountRow::to_account).transpose()
    }

    pub(super) async fn find_all_impl(&self) -> Result<Vec<Account>, DomainError> {
        self.fetch_list("", "find_all").await
    }

    pub(super) async fn find_enabled_impl(&self) -> Result<Vec<Account>, DomainError> {
        self.fetch_list("WHERE enabled = 1", "find_enabled").await
    }

    async fn fetch_list(&self, filter: &str, label: &str) -> Result<Vec<Account>, DomainError> {
        let start = Instant::now();

        let query = format!(
            r#"
            {}
            {}
            ORDER BY id ASC
        "#,
            Self::SELECT_QUERY,
            filter
        );

        let rows: Vec<AccountRow> = sqlx::query_as(&query)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, label))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            warn!(
                "🐌 SLOW QUERY: {}() took {:.2}ms for {} accounts",
                label,
                elapsed.as_secs_f64() * 1000.0,
                rows.len()
            );
        }

        // A single unreadable row must not hide every other account.
        let accounts = rows
            .into_iter()
            .filter_map(|row| match row.to_account() {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::error!("Failed to load account: {}", e);
                    None
                }
            })
            .collect();

        Ok(accounts)
    }
}
