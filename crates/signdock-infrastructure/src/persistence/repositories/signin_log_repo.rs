use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::persistence::RepositoryErrorMapper;
use signdock_domain::shared::{AccountId, DomainError};
use signdock_domain::signin::{
    Page, SigninLog, SigninLogQuery, SigninLogRepository, SigninLogStats, SigninResult,
};

#[derive(FromRow)]
struct SigninLogRow {
    id: i64,
    account_id: i64,
    account_name: String,
    success: bool,
    status_code: Option<i64>,
    message: String,
    response_data: Option<String>,
    execution_time_ms: i64,
    created_at: DateTime<Utc>,
}

impl From<SigninLogRow> for SigninLog {
    fn from(row: SigninLogRow) -> Self {
        SigninLog {
            id: row.id,
            account_id: AccountId::new(row.account_id),
            account_name: row.account_name,
            success: row.success,
            status_code: row.status_code.and_then(|c| u16::try_from(c).ok()),
            message: row.message,
            response_data: row.response_data,
            execution_time_ms: u64::try_from(row.execution_time_ms).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

pub struct SqliteSigninLogRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteSigninLogRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &SigninLogQuery) {
        builder.push(" WHERE 1 = 1");
        if let Some(account_id) = query.account_id {
            builder.push(" AND account_id = ").push_bind(account_id.value());
        }
        if let Some(status) = query.status {
            builder.push(" AND success = ").push_bind(status.as_bool());
        }
        if let Some(start) = query.start {
            builder.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = query.end {
            builder.push(" AND created_at <= ").push_bind(end);
        }
    }
}

#[async_trait]
impl SigninLogRepository for SqliteSigninLogRepository {
    async fn append(&self, result: &SigninResult) -> Result<SigninLog, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO signin_logs (
                account_id, account_name, success, status_code, message,
                response_data, execution_time_ms, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id
        "#,
        )
        .bind(result.account_id.value())
        .bind(&result.account_name)
        .bind(result.success)
        .bind(result.status_code.map(i64::from))
        .bind(&result.message)
        .bind(result.response_data.as_deref())
        .bind(i64::try_from(result.execution_time_ms).unwrap_or(i64::MAX))
        .bind(result.attempted_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Append signin log"))?;

        Ok(SigninLog::from_result(id, result))
    }

    async fn query(&self, query: &SigninLogQuery) -> Result<Page<SigninLog>, DomainError> {
        query.validate()?;
        let start = Instant::now();

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM signin_logs");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Count signin logs"))?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT id, account_id, account_name, success, status_code, message, \
             response_data, execution_time_ms, created_at FROM signin_logs",
        );
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.pagination.limit))
            .push(" OFFSET ")
            .push_bind(query.pagination.offset() as i64);

        let rows: Vec<SigninLogRow> = select
            .build_query_as()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Query signin logs"))?;

        info!(
            "📊 signin_logs.query(page {}): {:.2}ms, {} of {} rows",
            query.pagination.page,
            start.elapsed().as_secs_f64() * 1000.0,
            rows.len(),
            total
        );

        Ok(Page::new(
            rows.into_iter().map(SigninLog::from).collect(),
            total.max(0) as u64,
            query.pagination,
        ))
    }

    async fn stats(&self, account_id: Option<AccountId>) -> Result<SigninLogStats, DomainError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN success THEN 1 ELSE 0 END), 0) \
             FROM signin_logs",
        );
        if let Some(id) = account_id {
            builder.push(" WHERE account_id = ").push_bind(id.value());
        }

        let (total, success): (i64, i64) = builder
            .build_query_as()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Signin log stats"))?;

        Ok(SigninLogStats::new(total.max(0) as u64, success.max(0) as u64))
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM signin_logs")
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear signin logs"))?;
        Ok(result.rows_affected())
    }
}
