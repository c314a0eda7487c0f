use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::instrument;

use signdock_domain::account::{Account, AccountRepository};
use signdock_domain::shared::{AccountId, Clock, DomainError};
use signdock_domain::signin::{SigninLogRepository, SigninResult, SigninTransport};

mod classification;
mod request;
mod types;

pub use types::{ConnectionTestResult, ExecutorConfig};

/// One check-in attempt against one account.
///
/// Implementations never fail: transport and persistence problems surface as a
/// failed `SigninResult` or are logged.
#[async_trait]
pub trait SigninAttempt: Send + Sync {
    async fn execute(&self, account: &Account) -> SigninResult;
}

/// Sign-in executor service
pub struct SigninExecutor {
    transport: Arc<dyn SigninTransport>,
    account_repo: Arc<dyn AccountRepository>,
    log_repo: Arc<dyn SigninLogRepository>,
    clock: Arc<dyn Clock>,
    config: ExecutorConfig,
}

impl SigninExecutor {
    pub fn new(
        transport: Arc<dyn SigninTransport>,
        account_repo: Arc<dyn AccountRepository>,
        log_repo: Arc<dyn SigninLogRepository>,
        clock: Arc<dyn Clock>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            transport,
            account_repo,
            log_repo,
            clock,
            config,
        }
    }

    /// Runs a check-in for a stored account by id.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn execute_single(&self, id: AccountId) -> Result<SigninResult, DomainError> {
        let account = self
            .account_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AccountNotFound(id.to_string()))?;

        if !account.is_enabled() {
            return Err(DomainError::AccountDisabled(account.name().to_string()));
        }

        Ok(self.execute(&account).await)
    }

    /// Sends the configured request with the shorter probe timeout.
    /// Keywords are not checked and nothing is recorded.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn test_connection(&self, id: AccountId) -> Result<ConnectionTestResult, DomainError> {
        let account = self
            .account_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AccountNotFound(id.to_string()))?;

        let request = request::build_request(&account, self.clock.now());
        let started = Instant::now();
        let outcome = self.transport.send(&request, self.config.test_timeout).await;
        let execution_time_ms = elapsed_ms(started);

        let result = match outcome {
            Ok(response) => {
                let success = response.is_success_status();
                ConnectionTestResult {
                    success,
                    status: Some(response.status),
                    status_text: Some(response.status_text.clone()),
                    execution_time_ms,
                    response_data: Some(classification::preview(
                        &response.body,
                        self.config.preview_limit,
                    )),
                    message: if success {
                        format!("Connection OK (HTTP {})", response.status)
                    } else {
                        format!(
                            "Connection returned HTTP {} {}",
                            response.status, response.status_text
                        )
                    },
                }
            }
            Err(e) => ConnectionTestResult {
                success: false,
                status: None,
                status_text: None,
                execution_time_ms,
                response_data: None,
                message: classification::transport_failure(e.message()),
            },
        };

        info!(
            "[{}] Connection test: {} ({}ms)",
            account.name(),
            result.message,
            result.execution_time_ms
        );
        Ok(result)
    }

    async fn attempt(&self, account: &Account) -> SigninResult {
        let attempted_at = self.clock.now();
        let request = request::build_request(account, attempted_at);

        let started = Instant::now();
        let outcome = self
            .transport
            .send(&request, self.config.signin_timeout)
            .await;
        let execution_time_ms = elapsed_ms(started);

        match outcome {
            Ok(response) => {
                let verdict = classification::classify(&response, &account.success_keywords());
                SigninResult {
                    account_id: account.id(),
                    account_name: account.name().to_string(),
                    success: verdict.success,
                    status_code: Some(response.status),
                    message: verdict.message,
                    response_data: Some(classification::preview(
                        &response.body,
                        self.config.preview_limit,
                    )),
                    execution_time_ms,
                    attempted_at,
                }
            }
            Err(e) => SigninResult {
                account_id: account.id(),
                account_name: account.name().to_string(),
                success: false,
                status_code: None,
                message: classification::transport_failure(e.message()),
                response_data: None,
                execution_time_ms,
                attempted_at,
            },
        }
    }

    async fn persist(&self, result: &SigninResult) {
        if let Err(e) = self.log_repo.append(result).await {
            error!(
                "[{}] Failed to record sign-in log: {}",
                result.account_name,
                e.format_with_code()
            );
        }

        if let Err(e) = self
            .account_repo
            .update_last_signin(result.account_id, result.success, result.attempted_at)
            .await
        {
            warn!(
                "[{}] Failed to update last sign-in status: {}",
                result.account_name,
                e.format_with_code()
            );
        }
    }
}

#[async_trait]
impl SigninAttempt for SigninExecutor {
    #[instrument(skip(self, account), fields(account_id = %account.id()))]
    async fn execute(&self, account: &Account) -> SigninResult {
        info!("[{}] Starting sign-in", account.name());

        let result = self.attempt(account).await;
        self.persist(&result).await;

        if result.success {
            info!(
                "[{}] ✅ {} ({}ms)",
                result.account_name, result.message, result.execution_time_ms
            );
        } else {
            warn!(
                "[{}] ❌ {} ({}ms)",
                result.account_name, result.message, result.execution_time_ms
            );
        }
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
