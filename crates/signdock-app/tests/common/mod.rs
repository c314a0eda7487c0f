#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

use signdock_domain::account::{Account, AccountProfile, AccountRepository};
use signdock_domain::schedule::{TaskDefinition, TaskRepository};
use signdock_domain::shared::{AccountId, Clock, DomainError, TaskId};
use signdock_domain::signin::{
    Page, SigninLog, SigninLogQuery, SigninLogRepository, SigninLogStats, SigninRequest,
    SigninResponse, SigninResult, SigninTransport,
};
use signdock_domain::system_log::{NewSystemLog, SystemLog, SystemLogQuery, SystemLogRepository};

pub fn profile(name: &str) -> AccountProfile {
    AccountProfile::new(
        name,
        format!("https://{}.example.com/checkin", name.trim()),
        "sid=1",
    )
}

/// Wall clock that follows tokio's clock, so paused-time tests see time move.
pub struct TokioClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }

    /// 2024-01-01 00:00:30 UTC, half a minute before a minute boundary.
    pub fn half_past_midnight() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 30).unwrap())
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + chrono::Duration::from_std(self.start.elapsed()).unwrap_or_default()
    }
}

// Mock repositories for testing

#[derive(Default)]
pub struct MockAccountRepository {
    accounts: RwLock<BTreeMap<AccountId, Account>>,
    next_id: AtomicUsize,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, profile: AccountProfile) -> Account {
        self.create(&profile).await.expect("mock create")
    }

    pub async fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn create(&self, profile: &AccountProfile) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.name() == profile.name) {
            return Err(DomainError::Conflict(format!(
                "Account name '{}' is already taken",
                profile.name
            )));
        }
        let id = AccountId::new(self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1);
        let now = Utc::now();
        let account = Account::restore(id, profile.clone(), None, None, now, now);
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id()) {
            return Err(DomainError::AccountNotFound(account.id().to_string()));
        }
        accounts.insert(account.id(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| ids.contains(&a.id()))
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.name() == name).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn find_enabled(&self) -> Result<Vec<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.is_enabled())
            .cloned()
            .collect())
    }

    async fn delete(&self, id: AccountId) -> Result<(), DomainError> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::AccountNotFound(id.to_string()))
    }

    async fn update_last_signin(
        &self,
        id: AccountId,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(DomainError::AccountNotFound(id.to_string()))?;
        account.record_signin(success, at);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSigninLogRepository {
    logs: RwLock<Vec<SigninLog>>,
}

impl MockSigninLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<SigninLog> {
        self.logs.read().await.clone()
    }
}

#[async_trait]
impl SigninLogRepository for MockSigninLogRepository {
    async fn append(&self, result: &SigninResult) -> Result<SigninLog, DomainError> {
        let mut logs = self.logs.write().await;
        let log = SigninLog::from_result(logs.len() as i64 + 1, result);
        logs.push(log.clone());
        Ok(log)
    }

    async fn query(&self, query: &SigninLogQuery) -> Result<Page<SigninLog>, DomainError> {
        query.validate()?;
        let logs = self.logs.read().await;
        let matching: Vec<SigninLog> = logs
            .iter()
            .rev()
            .filter(|l| query.account_id.map_or(true, |id| l.account_id == id))
            .filter(|l| query.status.map_or(true, |s| l.success == s.as_bool()))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.pagination.offset() as usize)
            .take(query.pagination.limit as usize)
            .collect();
        Ok(Page::new(items, total, query.pagination))
    }

    async fn stats(&self, account_id: Option<AccountId>) -> Result<SigninLogStats, DomainError> {
        let logs = self.logs.read().await;
        let selected: Vec<&SigninLog> = logs
            .iter()
            .filter(|l| account_id.map_or(true, |id| l.account_id == id))
            .collect();
        let success = selected.iter().filter(|l| l.success).count() as u64;
        Ok(SigninLogStats::new(selected.len() as u64, success))
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let mut logs = self.logs.write().await;
        let count = logs.len() as u64;
        logs.clear();
        Ok(count)
    }
}

#[derive(Default)]
pub struct MockSystemLogRepository {
    logs: RwLock<Vec<SystemLog>>,
}

impl MockSystemLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.logs
            .read()
            .await
            .iter()
            .map(|l| format!("{}/{}: {}", l.category, l.level, l.message))
            .collect()
    }
}

#[async_trait]
impl SystemLogRepository for MockSystemLogRepository {
    async fn append(&self, entry: &NewSystemLog) -> Result<SystemLog, DomainError> {
        let mut logs = self.logs.write().await;
        let log = SystemLog {
            id: logs.len() as i64 + 1,
            level: entry.level,
            category: entry.category,
            message: entry.message.clone(),
            created_at: Utc::now(),
        };
        logs.push(log.clone());
        Ok(log)
    }

    async fn query(&self, query: &SystemLogQuery) -> Result<Page<SystemLog>, DomainError> {
        let logs = self.logs.read().await;
        let items: Vec<SystemLog> = logs
            .iter()
            .rev()
            .filter(|l| query.level.map_or(true, |level| l.level == level))
            .filter(|l| query.category.map_or(true, |c| l.category == c))
            .cloned()
            .collect();
        let total = items.len() as u64;
        Ok(Page::new(items, total, query.pagination))
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let mut logs = self.logs.write().await;
        let count = logs.len() as u64;
        logs.clear();
        Ok(count)
    }
}

#[derive(Default)]
pub struct MockTaskRepository {
    tasks: RwLock<HashMap<TaskId, TaskDefinition>>,
    failing: AtomicBool,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stored(&self, id: &TaskId) -> Option<TaskDefinition> {
        self.tasks.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Makes every write fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("disk full".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn save(&self, task: &TaskDefinition) -> Result<(), DomainError> {
        self.check_writable()?;
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<TaskDefinition>, DomainError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<TaskDefinition>, DomainError> {
        let mut tasks: Vec<TaskDefinition> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, DomainError> {
        self.check_writable()?;
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn record_run(
        &self,
        id: &TaskId,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))?;
        task.last_run = Some(last_run);
        task.next_run = next_run;
        Ok(())
    }
}

/// Canned reply for a URL.
#[derive(Clone)]
pub enum Reply {
    Status(u16, &'static str),
    Fail(&'static str),
}

/// Transport that answers from a URL table and records every request.
#[derive(Default)]
pub struct FakeTransport {
    replies: HashMap<String, Reply>,
    delay: Duration,
    sent: Mutex<Vec<(SigninRequest, Duration)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, url: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(url.into(), reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn sent(&self) -> Vec<(SigninRequest, Duration)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigninTransport for FakeTransport {
    async fn send(
        &self,
        request: &SigninRequest,
        timeout: Duration,
    ) -> Result<SigninResponse, DomainError> {
        self.sent.lock().unwrap().push((request.clone(), timeout));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.replies.get(&request.url).cloned() {
            Some(Reply::Status(status, body)) => Ok(SigninResponse {
                status,
                status_text: String::new(),
                body: body.to_string(),
            }),
            Some(Reply::Fail(reason)) => Err(DomainError::Transport(reason.to_string())),
            None => Ok(SigninResponse {
                status: 404,
                status_text: "Not Found".into(),
                body: String::new(),
            }),
        }
    }
}
