//! SQLite-backed implementation of the lead store boundary.
//!
//! Queries are validated upstream; this layer executes whatever projection
//! arrives and decodes it dynamically, since grouped/aggregated statements
//! produce shapes that are not known at compile time.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo};

use leadwise_core::session::Row;
use leadwise_core::store::{LeadStore, StoreError};

use crate::DbPool;

#[derive(Clone)]
pub struct SqlLeadStore {
    pool: DbPool,
}

impl SqlLeadStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for SqlLeadStore {
    async fn select(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| StoreError::Execution(error.to_string()))?;

        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &SqliteRow) -> Result<Row, StoreError> {
    let mut record = Row::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_column(row: &SqliteRow, ordinal: usize, type_name: &str) -> Result<Value, StoreError> {
    match type_name.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => row
            .try_get::<Option<i64>, _>(ordinal)
            .map(|value| value.map(Value::from).unwrap_or(Value::Null))
            .map_err(decode_error),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(ordinal)
            .map(float_to_value)
            .map_err(decode_error),
        "TEXT" | "VARCHAR" | "DATETIME" | "DATE" => row
            .try_get::<Option<String>, _>(ordinal)
            .map(|value| value.map(Value::from).unwrap_or(Value::Null))
            .map_err(decode_error),
        "NULL" => Ok(Value::Null),
        // BLOB and anything exotic: a last-resort textual rendering keeps
        // the row shape uniform without failing the whole result.
        _ => Ok(row
            .try_get::<Option<String>, _>(ordinal)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null)),
    }
}

fn float_to_value(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn decode_error(error: sqlx::Error) -> StoreError {
    StoreError::Decode(error.to_string())
}

#[cfg(test)]
mod tests {
    use leadwise_core::store::{LeadStore, StoreError};

    use super::SqlLeadStore;
    use crate::connection::memory_config;
    use crate::{connect, migrations, seed_demo_leads};

    async fn seeded_store() -> SqlLeadStore {
        let pool = connect(&memory_config()).await.expect("connect in-memory sqlite");
        migrations::run_pending(&pool).await.expect("run migrations");
        seed_demo_leads(&pool).await.expect("seed demo leads");
        SqlLeadStore::new(pool)
    }

    #[tokio::test]
    async fn plain_projection_decodes_typed_columns() {
        let store = seeded_store().await;
        let rows = store
            .select("SELECT customer_id, Segment, engagement_score FROM leadscored LIMIT 3")
            .await
            .expect("select leads");

        assert_eq!(rows.len(), 3);
        let first = &rows[0];
        assert!(first.get("customer_id").map(|value| value.is_i64()).unwrap_or(false));
        assert!(first.get("Segment").map(|value| value.is_string()).unwrap_or(false));
        assert!(first.get("engagement_score").map(|value| value.is_number()).unwrap_or(false));
    }

    #[tokio::test]
    async fn grouped_aggregate_is_decoded_dynamically() {
        let store = seeded_store().await;
        let rows = store
            .select(
                "SELECT Segment, COUNT(*) AS count FROM leadscored \
                 GROUP BY Segment ORDER BY COUNT(*) DESC",
            )
            .await
            .expect("grouped select");

        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert!(row.get("count").and_then(|value| value.as_i64()).unwrap_or(0) > 0);
        }
    }

    #[tokio::test]
    async fn empty_result_set_is_not_an_error() {
        let store = seeded_store().await;
        let rows = store
            .select("SELECT * FROM leadscored WHERE Country = 'Atlantis'")
            .await
            .expect("empty select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn storage_level_failure_surfaces_as_execution_error() {
        let store = seeded_store().await;
        let error = store
            .select("SELECT Revenue FROM leadscored")
            .await
            .expect_err("unknown column should fail");
        assert!(matches!(error, StoreError::Execution(_)));
    }
}
