//! Append-only persistence of lookup history.
//!
//! Each store call acquires its own pooled connection and releases it on
//! return. No transaction spans more than one call and no application-level
//! lock guards the table; concurrent appends are ordered by PostgreSQL alone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use serde::Serialize;
use thiserror::Error;
use tokio_postgres::{NoTls, Row};

/// Errors from the history store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
}

/// A persisted lookup attempt. Serialized with the history table's column
/// names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub route: String,
    pub method: String,
    pub domain: String,
    #[serde(rename = "req_body")]
    pub request_body: String,
    #[serde(rename = "res_code")]
    pub response_code: i32,
    #[serde(rename = "res_body")]
    pub response_body: String,
    pub created_at: DateTime<Utc>,
}

/// A history entry before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub route: String,
    pub method: String,
    pub domain: String,
    pub request_body: String,
    pub response_code: i32,
    pub response_body: String,
}

impl NewHistoryRecord {
    /// Completes the record with store-assigned fields.
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            id,
            route: self.route,
            method: self.method,
            domain: self.domain,
            request_body: self.request_body,
            response_code: self.response_code,
            response_body: self.response_body,
            created_at,
        }
    }
}

/// Append-only history of lookups.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persists `record`, returning it with its assigned id and timestamp.
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, StoreError>;

    /// Returns up to `n` most recent records, newest first. Empty when the
    /// store holds none.
    async fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>, StoreError>;
}

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS history (
    id BIGSERIAL PRIMARY KEY,
    route TEXT NOT NULL,
    method TEXT NOT NULL,
    domain TEXT NOT NULL,
    req_body TEXT NOT NULL DEFAULT '',
    res_code INTEGER NOT NULL,
    res_body TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

/// PostgreSQL-backed history store.
pub struct PgHistoryStore {
    pool: Pool,
}

impl PgHistoryStore {
    /// Creates the connection pool and checks that a connection can be made.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(url.to_string());
        cfg.pool = Some(PoolConfig::new(pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Config(e.to_string()))?;

        // Test connection
        let _ = pool.get().await?;

        Ok(Self { pool })
    }

    /// Creates the history table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;
        conn.batch_execute(CREATE_TABLE).await?;
        Ok(())
    }
}

fn row_to_record(row: &Row) -> Result<HistoryRecord, StoreError> {
    Ok(HistoryRecord {
        id: row.try_get("id")?,
        route: row.try_get("route")?,
        method: row.try_get("method")?,
        domain: row.try_get("domain")?,
        request_body: row.try_get("req_body")?,
        response_code: row.try_get("res_code")?,
        response_body: row.try_get("res_body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, StoreError> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO history (route, method, domain, req_body, res_code, res_body) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id, created_at",
                &[
                    &record.route,
                    &record.method,
                    &record.domain,
                    &record.request_body,
                    &record.response_code,
                    &record.response_body,
                ],
            )
            .await?;

        let id: i64 = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(record.into_record(id, created_at))
    }

    async fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT id, route, method, domain, req_body, res_code, res_body, created_at \
                 FROM history ORDER BY id DESC LIMIT $1",
                &[&limit],
            )
            .await?;

        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lookup_entry(domain: &str) -> NewHistoryRecord {
        NewHistoryRecord {
            route: "/v1/tools/lookup".to_string(),
            method: "GET".to_string(),
            domain: domain.to_string(),
            request_body: format!("domain={}", domain),
            response_code: 200,
            response_body: "{}".to_string(),
        }
    }

    #[test]
    fn test_record_uses_column_names_on_the_wire() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = lookup_entry("example.com").into_record(7, created_at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["route"], "/v1/tools/lookup");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["req_body"], "domain=example.com");
        assert_eq!(json["res_code"], 200);
        assert_eq!(json["res_body"], "{}");
        assert_eq!(json["created_at"], "2024-03-01T12:00:00Z");
        assert!(json.get("request_body").is_none());
    }

    #[cfg(feature = "integration")]
    #[tokio::test]
    async fn test_postgres_append_and_recent() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let store = PgHistoryStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();

        let first = store.append(lookup_entry("first.example")).await.unwrap();
        let second = store.append(lookup_entry("second.example")).await.unwrap();
        assert!(second.id > first.id);

        let rows = store.recent(2).await.unwrap();
        assert_eq!(rows, vec![second, first]);
    }
}
