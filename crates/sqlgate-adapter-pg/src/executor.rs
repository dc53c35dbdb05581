//! Read-only query execution against Postgres.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Value};
use sqlgate_core::{ErrorCode, GatewayError};
use sqlgate_rewrite::LexicalGuard;
use sqlgate_runtime::{ReadOnlyExecutor, Row};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row as _};

/// SQLSTATE codes that mean the query disagrees with the live schema.
const SCHEMA_SQLSTATES: &[&str] = &["42703", "42P01", "42702", "42883", "42P10", "42601"];

/// Executes rewritten queries inside a read-only transaction with a
/// statement timeout.
pub struct PgReadOnlyExecutor {
    pool: PgPool,
    statement_timeout_ms: u64,
    guard: LexicalGuard,
}

impl PgReadOnlyExecutor {
    pub fn new(pool: PgPool, statement_timeout_ms: u64) -> Self {
        Self {
            pool,
            statement_timeout_ms,
            guard: LexicalGuard::new(),
        }
    }

    /// Connect a bounded pool and wrap it.
    pub async fn connect(database_url: &str, statement_timeout_ms: u64) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, statement_timeout_ms))
    }
}

#[async_trait]
impl ReadOnlyExecutor for PgReadOnlyExecutor {
    async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, GatewayError> {
        // defense in depth: refuse anything the pipeline would not emit,
        // even if some future caller bypasses the orchestrator
        self.guard.check(sql)?;

        let mut tx = self.pool.begin().await.map_err(classify_db_error)?;
        // sqlx rolls the transaction back when the guard drops, including on
        // cancellation, so every early return below releases cleanly
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout_ms
        ))
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param.as_str());
        }
        let rows = query.fetch_all(&mut *tx).await.map_err(|e| {
            tracing::warn!(error = %e, "Query execution failed");
            classify_db_error(e)
        })?;
        tx.commit().await.map_err(classify_db_error)?;

        Ok(rows.iter().map(row_to_map).collect())
    }
}

/// Split database failures into schema disagreements (retryable by asking
/// the model for a corrected candidate) and everything else.
fn classify_db_error(err: sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(db_err) = &err {
        let message = db_err.message().to_string();
        let lower = message.to_lowercase();
        let code = db_err.code();
        if code
            .as_deref()
            .map_or(false, |c| SCHEMA_SQLSTATES.contains(&c))
            || lower.contains("column")
            || lower.contains("relation")
            || lower.contains("syntax error")
        {
            return GatewayError::new(ErrorCode::DbSchemaError, message);
        }
        return GatewayError::new(ErrorCode::DbOther, message);
    }
    GatewayError::new(ErrorCode::DbOther, err.to_string())
}

/// Convert one Postgres row into a column-name-to-JSON map.
///
/// Tries the concrete types a SELECT over a business schema actually
/// produces, most specific first, and falls back to null.
fn row_to_map(row: &PgRow) -> Row {
    use bigdecimal::ToPrimitive;

    let mut map = Row::new();
    for column in row.columns() {
        let name = column.name();

        let value: Value = if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(name) {
            v.map_or(Value::Null, |d| json!(d.to_f64().unwrap_or(0.0)))
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
            v.map_or(Value::Null, |v| json!(v))
        } else if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(name) {
            v.map_or(Value::Null, |dt| json!(dt.to_rfc3339()))
        } else if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(name) {
            v.map_or(Value::Null, |dt| {
                json!(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            })
        } else if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(name) {
            v.map_or(Value::Null, |d| json!(d.format("%Y-%m-%d").to_string()))
        } else if let Ok(v) = row.try_get::<Option<NaiveTime>, _>(name) {
            v.map_or(Value::Null, |t| json!(t.format("%H:%M:%S").to_string()))
        } else if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
            v.map_or(Value::Null, |u| json!(u.to_string()))
        } else if let Ok(v) = row.try_get::<Option<String>, _>(name) {
            v.map_or(Value::Null, |s| json!(s))
        } else if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
            v.unwrap_or(Value::Null)
        } else {
            Value::Null
        };

        map.insert(name.to_string(), value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlstate_list_matches_schema_disagreements() {
        assert!(SCHEMA_SQLSTATES.contains(&"42P01")); // undefined_table
        assert!(SCHEMA_SQLSTATES.contains(&"42703")); // undefined_column
        assert!(!SCHEMA_SQLSTATES.contains(&"57014")); // query_canceled
    }

    #[test]
    fn non_database_errors_map_to_db_other() {
        let err = classify_db_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.code, ErrorCode::DbOther);
    }
}
