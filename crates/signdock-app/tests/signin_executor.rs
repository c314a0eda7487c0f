mod common;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

use common::{
    profile, FakeTransport, MockAccountRepository, MockSigninLogRepository, Reply, TokioClock,
};
use signdock_domain::account::{AccountProfile, AccountRepository, HttpMethod};
use signdock_domain::shared::{AccountId, DomainError};
use signdock_domain::signin::{
    Page, SigninLog, SigninLogQuery, SigninLogRepository, SigninLogStats, SigninResult,
};
use signdock_lib::application::services::{ExecutorConfig, SigninAttempt, SigninExecutor};

mock! {
    pub SigninLogs {}

    #[async_trait]
    impl SigninLogRepository for SigninLogs {
        async fn append(&self, result: &SigninResult) -> Result<SigninLog, DomainError>;
        async fn query(&self, query: &SigninLogQuery) -> Result<Page<SigninLog>, DomainError>;
        async fn stats(&self, account_id: Option<AccountId>) -> Result<SigninLogStats, DomainError>;
        async fn clear(&self) -> Result<u64, DomainError>;
    }
}

struct Harness {
    transport: Arc<FakeTransport>,
    accounts: Arc<MockAccountRepository>,
    logs: Arc<MockSigninLogRepository>,
    executor: SigninExecutor,
}

fn harness(transport: FakeTransport) -> Harness {
    let transport = Arc::new(transport);
    let accounts = Arc::new(MockAccountRepository::new());
    let logs = Arc::new(MockSigninLogRepository::new());
    let executor = SigninExecutor::new(
        transport.clone(),
        accounts.clone(),
        logs.clone(),
        Arc::new(TokioClock::starting_at(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        )),
        ExecutorConfig {
            preview_limit: 16,
            ..ExecutorConfig::default()
        },
    );
    Harness {
        transport,
        accounts,
        logs,
        executor,
    }
}

fn with_keyword(name: &str, keyword: &str) -> AccountProfile {
    let mut p = profile(name);
    p.success_keyword = Some(keyword.into());
    p
}

#[tokio::test]
async fn success_status_without_keyword_succeeds() {
    let h = harness(
        FakeTransport::new().reply("https://a.example.com/checkin", Reply::Status(302, "")),
    );
    let account = h.accounts.add(profile("a")).await;

    let result = h.executor.execute(&account).await;

    assert!(result.success, "{}", result.message);
    assert_eq!(result.status_code, Some(302));
    assert_eq!(result.account_name, "a");
}

#[tokio::test]
async fn error_status_fails_even_with_matching_keyword() {
    let h = harness(FakeTransport::new().reply(
        "https://a.example.com/checkin",
        Reply::Status(500, r#"{"status":"ok"}"#),
    ));
    let account = h.accounts.add(with_keyword("a", "ok")).await;

    let result = h.executor.execute(&account).await;

    assert!(!result.success);
    assert_eq!(result.status_code, Some(500));
    assert!(result.message.contains("HTTP 500"));
}

#[tokio::test]
async fn comma_separated_keywords_match_case_insensitively() {
    let h = harness(FakeTransport::new().reply(
        "https://a.example.com/checkin",
        Reply::Status(200, r#"{"result":"SUCCESS"}"#),
    ));
    let account = h.accounts.add(with_keyword("a", "ok, success")).await;

    assert!(h.executor.execute(&account).await.success);
}

#[tokio::test]
async fn keyword_is_matched_against_full_body_but_preview_is_truncated() {
    let body: &'static str = "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx checked in";
    let h = harness(
        FakeTransport::new().reply("https://a.example.com/checkin", Reply::Status(200, body)),
    );
    let account = h.accounts.add(with_keyword("a", "checked in")).await;

    let result = h.executor.execute(&account).await;

    assert!(result.success);
    assert_eq!(result.response_data.as_deref(), Some("xxxxxxxxxxxxxxxx"));
}

#[tokio::test]
async fn transport_error_becomes_failed_result_and_is_logged() {
    let h = harness(FakeTransport::new().reply(
        "https://a.example.com/checkin",
        Reply::Fail("Connection failed: refused"),
    ));
    let account = h.accounts.add(profile("a")).await;

    let result = h.executor.execute(&account).await;

    assert!(!result.success);
    assert_eq!(result.status_code, None);
    assert_eq!(result.message, "Request failed: Connection failed: refused");

    let logs = h.logs.all().await;
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);

    let stored = h.accounts.get(account.id()).await.unwrap();
    assert_eq!(stored.last_signin_status(), Some(false));
    assert_eq!(stored.last_signin_at(), Some(result.attempted_at));
}

#[tokio::test]
async fn every_attempt_appends_exactly_one_log() {
    let h = harness(
        FakeTransport::new().reply("https://a.example.com/checkin", Reply::Status(200, "ok")),
    );
    let account = h.accounts.add(profile("a")).await;

    h.executor.execute(&account).await;
    h.executor.execute(&account).await;

    assert_eq!(h.logs.all().await.len(), 2);
}

#[tokio::test]
async fn persistence_failure_does_not_change_reported_outcome() {
    let transport =
        Arc::new(FakeTransport::new().reply("https://a.example.com/checkin", Reply::Status(200, "")));
    let accounts = Arc::new(MockAccountRepository::new());
    let account = accounts.add(profile("a")).await;

    let mut logs = MockSigninLogs::new();
    logs.expect_append()
        .times(1)
        .returning(|_| Err(DomainError::Repository("disk full".into())));

    let executor = SigninExecutor::new(
        transport,
        accounts.clone(),
        Arc::new(logs),
        Arc::new(TokioClock::half_past_midnight()),
        ExecutorConfig::default(),
    );

    let result = executor.execute(&account).await;

    assert!(result.success);
    let stored = accounts.get(account.id()).await.unwrap();
    assert_eq!(stored.last_signin_status(), Some(true));
}

#[tokio::test]
async fn signin_request_uses_long_timeout_and_sends_rendered_body() {
    let h = harness(
        FakeTransport::new().reply("https://a.example.com/checkin", Reply::Status(200, "")),
    );
    let mut p = profile("a");
    p.request_body = Some(r#"{"day":"{{date}}"}"#.into());
    let account = h.accounts.add(p).await;

    h.executor.execute(&account).await;

    let sent = h.transport.sent();
    let (request, timeout) = &sent[0];
    assert_eq!(*timeout, Duration::from_secs(30));
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.body, Some(serde_json::json!({"day": "2024-03-01"})));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("cookie"), Some("sid=1"));
}

#[tokio::test]
async fn execute_single_rejects_unknown_and_disabled_accounts() {
    let h = harness(FakeTransport::new());

    let err = h.executor.execute_single(AccountId::new(42)).await.unwrap_err();
    assert!(matches!(err, DomainError::AccountNotFound(_)));

    let mut disabled = profile("off");
    disabled.enabled = false;
    let account = h.accounts.add(disabled).await;

    let err = h.executor.execute_single(account.id()).await.unwrap_err();
    assert!(matches!(err, DomainError::AccountDisabled(_)));
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_connection_uses_short_timeout_and_persists_nothing() {
    let h = harness(FakeTransport::new().reply(
        "https://a.example.com/checkin",
        Reply::Status(200, "no keyword here"),
    ));
    let account = h.accounts.add(with_keyword("a", "welcome")).await;

    let result = h.executor.test_connection(account.id()).await.unwrap();

    assert!(result.success, "keywords are not checked by a probe");
    assert_eq!(result.status, Some(200));
    assert_eq!(h.transport.sent()[0].1, Duration::from_secs(10));
    assert!(h.logs.all().await.is_empty());
    assert_eq!(
        h.accounts
            .find_by_id(account.id())
            .await
            .unwrap()
            .unwrap()
            .last_signin_at(),
        None
    );
}

#[tokio::test]
async fn test_connection_reports_transport_failure() {
    let h = harness(
        FakeTransport::new().reply("https://a.example.com/checkin", Reply::Fail("timed out")),
    );
    let account = h.accounts.add(profile("a")).await;

    let result = h.executor.test_connection(account.id()).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.status, None);
    assert!(result.message.contains("timed out"));
}
