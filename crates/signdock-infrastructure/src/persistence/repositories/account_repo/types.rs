use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::persistence::RepositoryErrorMapper;
use signdock_domain::account::{Account, AccountProfile, HttpMethod};
use signdock_domain::shared::{AccountId, DomainError};

#[derive(FromRow)]
pub(super) struct AccountRow {
    pub id: i64,
    pub name: String,
    pub signin_url: String,
    pub method: String,
    pub cookies: String,
    pub headers: Option<String>,
    pub request_body: Option<String>,
    pub success_keyword: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub last_signin_at: Option<DateTime<Utc>>,
    pub last_signin_status: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    #[allow(clippy::wrong_self_convention)]
    pub fn to_account(self) -> Result<Account, DomainError> {
        let method: HttpMethod = self
            .method
            .parse()
            .map_err(|e| RepositoryErrorMapper::corrupt("accounts.method", e))?;

        let profile = AccountProfile {
            name: self.name,
            signin_url: self.signin_url,
            method,
            cookies: self.cookies,
            headers: self.headers,
            request_body: self.request_body,
            success_keyword: self.success_keyword,
            description: self.description,
            enabled: self.enabled,
        };

        Ok(Account::restore(
            AccountId::new(self.id),
            profile,
            self.last_signin_at,
            self.last_signin_status,
            self.created_at,
            self.updated_at,
        ))
    }
}
