use chrono::{Duration, TimeZone, Utc};
use signdock_domain::account::{AccountPatch, AccountProfile, AccountRepository, HttpMethod};
use signdock_domain::schedule::{CronExpression, TaskDefinition, TaskRepository};
use signdock_domain::shared::{AccountId, DomainError, TaskId};
use signdock_domain::signin::{
    LogStatus, Pagination, SigninLogQuery, SigninLogRepository, SigninResult,
};
use signdock_domain::system_log::{
    NewSystemLog, SystemLogCategory, SystemLogLevel, SystemLogQuery, SystemLogRepository,
};
use signdock_infrastructure::persistence::repositories::{
    SqliteAccountRepository, SqliteSigninLogRepository, SqliteSystemLogRepository,
    SqliteTaskRepository,
};
use signdock_infrastructure::persistence::Database;

async fn database() -> Database {
    Database::in_memory()
        .await
        .expect("in-memory database should open")
}

fn profile(name: &str) -> AccountProfile {
    AccountProfile::new(name, "https://example.com/api/checkin", "session=abc")
}

fn attempt(account_id: i64, success: bool, minutes_ago: i64) -> SigninResult {
    SigninResult {
        account_id: AccountId::new(account_id),
        account_name: format!("account-{}", account_id),
        success,
        status_code: Some(if success { 200 } else { 500 }),
        message: if success { "ok".into() } else { "HTTP 500".into() },
        response_data: Some("{}".into()),
        execution_time_ms: 12,
        attempted_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn account_create_assigns_id_and_round_trips_fields() {
    let db = database().await;
    let repo = SqliteAccountRepository::new(db.pool());

    let mut input = profile("alice");
    input.method = HttpMethod::Get;
    input.headers = Some(r#"{"X-Token":"t"}"#.into());
    input.success_keyword = Some("ok,success".into());

    let created = repo.create(&input).await.expect("create");
    let loaded = repo
        .find_by_id(created.id())
        .await
        .expect("find")
        .expect("account exists");

    assert_eq!(loaded.name(), "alice");
    assert_eq!(loaded.method(), HttpMethod::Get);
    assert_eq!(loaded.headers(), Some(r#"{"X-Token":"t"}"#));
    assert_eq!(loaded.success_keywords().keywords().len(), 2);
    assert!(loaded.is_enabled());
    assert_eq!(loaded.last_signin_status(), None);
}

#[tokio::test]
async fn duplicate_account_name_is_a_conflict() {
    let db = database().await;
    let repo = SqliteAccountRepository::new(db.pool());

    repo.create(&profile("alice")).await.expect("first create");
    let err = repo.create(&profile("alice")).await.unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
async fn renaming_onto_existing_name_is_a_conflict() {
    let db = database().await;
    let repo = SqliteAccountRepository::new(db.pool());
    repo.create(&profile("alice")).await.expect("create alice");
    let mut bob = repo.create(&profile("bob")).await.expect("create bob");

    bob.apply_patch(
        AccountPatch {
            name: Some("alice".into()),
            ..Default::default()
        },
        Utc::now(),
    )
    .expect("patch is valid in isolation");

    let err = repo.update(&bob).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn find_enabled_and_find_by_ids_filter_correctly() {
    let db = database().await;
    let repo = SqliteAccountRepository::new(db.pool());

    let a = repo.create(&profile("a")).await.unwrap();
    let mut disabled = profile("b");
    disabled.enabled = false;
    let b = repo.create(&disabled).await.unwrap();
    let c = repo.create(&profile("c")).await.unwrap();

    let enabled: Vec<_> = repo
        .find_enabled()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id())
        .collect();
    assert_eq!(enabled, vec![a.id(), c.id()]);

    let selected = repo
        .find_by_ids(&[c.id(), b.id(), AccountId::new(999)])
        .await
        .unwrap();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].id(), b.id());

    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    assert_eq!(
        repo.find_by_name("c").await.unwrap().map(|a| a.id()),
        Some(c.id())
    );
}

#[tokio::test]
async fn update_last_signin_and_delete() {
    let db = database().await;
    let repo = SqliteAccountRepository::new(db.pool());
    let account = repo.create(&profile("alice")).await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    repo.update_last_signin(account.id(), true, at).await.unwrap();

    let loaded = repo.find_by_id(account.id()).await.unwrap().unwrap();
    assert_eq!(loaded.last_signin_at(), Some(at));
    assert_eq!(loaded.last_signin_status(), Some(true));

    repo.delete(account.id()).await.unwrap();
    assert!(repo.find_by_id(account.id()).await.unwrap().is_none());

    let err = repo.delete(account.id()).await.unwrap_err();
    assert!(matches!(err, DomainError::AccountNotFound(_)));

    let err = repo
        .update_last_signin(account.id(), false, at)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AccountNotFound(_)));
}

#[tokio::test]
async fn signin_logs_filter_paginate_and_report_stats() {
    let db = database().await;
    let repo = SqliteSigninLogRepository::new(db.pool());

    repo.append(&attempt(1, true, 30)).await.unwrap();
    repo.append(&attempt(1, false, 20)).await.unwrap();
    repo.append(&attempt(2, true, 10)).await.unwrap();

    let all = repo.query(&SigninLogQuery::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items[0].account_id, AccountId::new(2), "newest first");

    let failed = repo
        .query(&SigninLogQuery {
            status: Some(LogStatus::Failed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(failed.total, 1);
    assert_eq!(failed.items[0].status_code, Some(500));

    let second_page = repo
        .query(&SigninLogQuery {
            account_id: Some(AccountId::new(1)),
            pagination: Pagination::new(2, 1).unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second_page.total, 2);
    assert_eq!(second_page.items.len(), 1);
    assert!(second_page.items[0].success, "oldest entry on page 2");

    let recent = repo
        .query(&SigninLogQuery {
            start: Some(Utc::now() - Duration::minutes(15)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(recent.total, 1);

    let stats = repo.stats(None).await.unwrap();
    assert_eq!((stats.total, stats.success, stats.failed), (3, 2, 1));
    let stats = repo.stats(Some(AccountId::new(1))).await.unwrap();
    assert_eq!(stats.success_rate, 50.0);

    assert_eq!(repo.clear().await.unwrap(), 3);
    assert_eq!(repo.stats(None).await.unwrap().total, 0);
}

#[tokio::test]
async fn signin_log_query_rejects_bad_pagination() {
    let db = database().await;
    let repo = SqliteSigninLogRepository::new(db.pool());

    let err = repo
        .query(&SigninLogQuery {
            pagination: Pagination { page: 0, limit: 20 },
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
async fn signin_logs_survive_account_deletion() {
    let db = database().await;
    let accounts = SqliteAccountRepository::new(db.pool());
    let logs = SqliteSigninLogRepository::new(db.pool());

    let account = accounts.create(&profile("ghost")).await.unwrap();
    let mut result = attempt(account.id().value(), true, 0);
    result.account_name = "ghost".into();
    logs.append(&result).await.unwrap();

    accounts.delete(account.id()).await.unwrap();

    let page = logs.query(&SigninLogQuery::default()).await.unwrap();
    assert_eq!(page.items[0].account_name, "ghost");
}

#[tokio::test]
async fn system_logs_filter_by_level_and_category() {
    let db = database().await;
    let repo = SqliteSystemLogRepository::new(db.pool());

    repo.append(&NewSystemLog::info(SystemLogCategory::Schedule, "started"))
        .await
        .unwrap();
    repo.append(&NewSystemLog::error(SystemLogCategory::Schedule, "failed"))
        .await
        .unwrap();
    repo.append(&NewSystemLog::info(SystemLogCategory::Manual, "manual run"))
        .await
        .unwrap();

    let errors = repo
        .query(&SystemLogQuery {
            level: Some(SystemLogLevel::Error),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(errors.total, 1);
    assert_eq!(errors.items[0].message, "failed");

    let manual = repo
        .query(&SystemLogQuery {
            category: Some(SystemLogCategory::Manual),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(manual.total, 1);

    assert_eq!(repo.clear().await.unwrap(), 3);
}

#[tokio::test]
async fn tasks_upsert_record_runs_and_delete() {
    let db = database().await;
    let repo = SqliteTaskRepository::new(db.pool());
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let mut task = TaskDefinition::new(
        TaskId::from_string("daily-signin"),
        "Daily automatic sign-in",
        CronExpression::parse("0 9 * * *").unwrap(),
        true,
        now,
    )
    .unwrap();
    repo.save(&task).await.unwrap();

    task.cron_expression = CronExpression::parse("30 8 * * *").unwrap();
    task.enabled = false;
    repo.save(&task).await.unwrap();

    let next = now + Duration::days(1);
    repo.record_run(&task.id, now, Some(next)).await.unwrap();

    let loaded = repo.find_by_id(&task.id).await.unwrap().unwrap();
    assert_eq!(loaded.cron_expression.as_str(), "30 8 * * *");
    assert!(!loaded.enabled);
    assert_eq!(loaded.last_run, Some(now));
    assert_eq!(loaded.next_run, Some(next));
    assert_eq!(repo.find_all().await.unwrap().len(), 1);

    assert!(repo.delete(&task.id).await.unwrap());
    assert!(!repo.delete(&task.id).await.unwrap());
    assert!(repo.find_by_id(&task.id).await.unwrap().is_none());
}
