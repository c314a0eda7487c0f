use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::persistence::RepositoryErrorMapper;
use signdock_domain::shared::DomainError;
use signdock_domain::signin::Page;
use signdock_domain::system_log::{NewSystemLog, SystemLog, SystemLogQuery, SystemLogRepository};

#[derive(FromRow)]
struct SystemLogRow {
    id: i64,
    level: String,
    category: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl SystemLogRow {
    #[allow(clippy::wrong_self_convention)]
    fn to_log(self) -> Result<SystemLog, DomainError> {
        Ok(SystemLog {
            id: self.id,
            level: self
                .level
                .parse()
                .map_err(|e| RepositoryErrorMapper::corrupt("system_logs.level", e))?,
            category: self
                .category
                .parse()
                .map_err(|e| RepositoryErrorMapper::corrupt("system_logs.category", e))?,
            message: self.message,
            created_at: self.created_at,
        })
    }
}

pub struct SqliteSystemLogRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteSystemLogRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &SystemLogQuery) {
        builder.push(" WHERE 1 = 1");
        if let Some(level) = query.level {
            builder.push(" AND level = ").push_bind(level.as_str());
        }
        if let Some(category) = query.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
    }
}

#[async_trait]
impl SystemLogRepository for SqliteSystemLogRepository {
    async fn append(&self, entry: &NewSystemLog) -> Result<SystemLog, DomainError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO system_logs (level, category, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
        "#,
        )
        .bind(entry.level.as_str())
        .bind(entry.category.as_str())
        .bind(&entry.message)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Append system log"))?;

        Ok(SystemLog {
            id,
            level: entry.level,
            category: entry.category,
            message: entry.message.clone(),
            created_at: now,
        })
    }

    async fn query(&self, query: &SystemLogQuery) -> Result<Page<SystemLog>, DomainError> {
        let pagination = query.pagination;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM system_logs");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Count system logs"))?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT id, level, category, message, created_at FROM system_logs",
        );
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset() as i64);

        let rows: Vec<SystemLogRow> = select
            .build_query_as()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Query system logs"))?;

        let items = rows
            .into_iter()
            .map(SystemLogRow::to_log)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total.max(0) as u64, pagination))
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM system_logs")
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear system logs"))?;
        Ok(result.rows_affected())
    }
}
