use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use signdock_domain::account::{Account, AccountPatch, AccountProfile, AccountRepository};
use signdock_domain::shared::{AccountId, Clock, DomainError};

/// Overview of account sign-in state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigninStatusOverview {
    pub total_accounts: usize,
    pub enabled: usize,
    pub disabled: usize,
    /// Most recent attempt among enabled accounts
    pub last_signin_at: Option<DateTime<Utc>>,
}

/// Account management service
pub struct AccountService {
    account_repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(account_repo: Arc<dyn AccountRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account_repo,
            clock,
        }
    }

    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub async fn create(&self, profile: AccountProfile) -> Result<Account, DomainError> {
        let profile = profile.normalized();
        profile.validate()?;

        if self.account_repo.find_by_name(&profile.name).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Account name '{}' is already taken",
                profile.name
            )));
        }

        let account = self.account_repo.create(&profile).await?;
        info!("Account created: {} ({})", account.name(), account.id());
        Ok(account)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: AccountId, patch: AccountPatch) -> Result<Account, DomainError> {
        let mut account = self.load(id).await?;
        if patch.is_empty() {
            return Ok(account);
        }

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if let Some(other) = self.account_repo.find_by_name(name).await? {
                if other.id() != id {
                    return Err(DomainError::Conflict(format!(
                        "Account name '{}' is already taken",
                        name
                    )));
                }
            }
        }

        account.apply_patch(patch, self.clock.now())?;
        self.account_repo.update(&account).await?;

        info!("Account updated: {} ({})", account.name(), id);
        Ok(account)
    }

    /// Sign-in logs of the account are kept.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AccountId) -> Result<(), DomainError> {
        self.account_repo.delete(id).await?;
        info!("Account deleted: {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, id: AccountId, enabled: bool) -> Result<Account, DomainError> {
        let mut account = self.load(id).await?;
        if account.is_enabled() == enabled {
            return Ok(account);
        }

        account.set_enabled(enabled, self.clock.now());
        self.account_repo.update(&account).await?;

        info!(
            "Account {} {}",
            account.name(),
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(account)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, DomainError> {
        self.load(id).await
    }

    pub async fn list(&self) -> Result<Vec<Account>, DomainError> {
        self.account_repo.find_all().await
    }

    pub async fn signin_status(&self) -> Result<SigninStatusOverview, DomainError> {
        let accounts = self.account_repo.find_all().await?;
        let enabled = accounts.iter().filter(|a| a.is_enabled()).count();

        Ok(SigninStatusOverview {
            total_accounts: accounts.len(),
            enabled,
            disabled: accounts.len() - enabled,
            last_signin_at: accounts
                .iter()
                .filter(|a| a.is_enabled())
                .filter_map(Account::last_signin_at)
                .max(),
        })
    }

    /// Creates each profile independently; failures are logged and skipped.
    #[instrument(skip(self, profiles), fields(count = profiles.len()))]
    pub async fn import_accounts(&self, profiles: Vec<AccountProfile>) -> Vec<Account> {
        let total = profiles.len();
        let mut created = Vec::with_capacity(total);

        for profile in profiles {
            let name = profile.name.clone();
            match self.create(profile).await {
                Ok(account) => created.push(account),
                Err(e) => warn!("Skipping import of '{}': {}", name, e.format_with_code()),
            }
        }

        info!("Imported {}/{} accounts", created.len(), total);
        created
    }

    async fn load(&self, id: AccountId) -> Result<Account, DomainError> {
        self.account_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AccountNotFound(id.to_string()))
    }
}
