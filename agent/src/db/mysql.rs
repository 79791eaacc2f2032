//! MySQL implementation of the database layer
//!
//! One connection opened at startup and shared behind a mutex. There is
//! exactly one caller per process, so no pooling is involved.

use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder, Row, Value};
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::error::{ExecutionError, StartupError};
use crate::translator::SqlAction;

use super::{ColumnInfo, Database, QueryOutput};

/// MySQL client over a single shared connection
pub struct MySqlClient {
    conn: Arc<Mutex<Conn>>,
}

impl MySqlClient {
    /// Open the connection described by the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StartupError> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.name.clone()));

        let conn = Conn::new(opts).await.map_err(|e| StartupError::Database {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })?;

        tracing::info!(host = %config.host, port = config.port, db = %config.name, "connected to MySQL");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl Database for MySqlClient {
    async fn probe(&self, table: &str) -> Result<u64, ExecutionError> {
        let mut conn = self.conn.lock().await;
        let count: Option<u64> = conn
            .query_first(format!("SELECT COUNT(*) FROM {}", table))
            .await
            .map_err(|e| ExecutionError::Query(e.to_string()))?;
        Ok(count.unwrap_or(0))
    }

    async fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>, ExecutionError> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<Row> = conn
            .query(format!("DESCRIBE {}", table))
            .await
            .map_err(|e| ExecutionError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnInfo {
                name: row.get::<String, _>(0).unwrap_or_default(),
                data_type: row.get::<String, _>(1).unwrap_or_default(),
            })
            .collect())
    }

    async fn execute(&self, action: SqlAction, sql: &str) -> Result<QueryOutput, ExecutionError> {
        let mut conn = self.conn.lock().await;

        if action.is_read() {
            let rows: Vec<Row> = conn
                .query(sql)
                .await
                .map_err(|e| ExecutionError::Query(e.to_string()))?;

            let columns: Vec<String> = rows
                .first()
                .map(|row| {
                    row.columns_ref()
                        .iter()
                        .map(|column| column.name_str().into_owned())
                        .collect()
                })
                .unwrap_or_default();

            let rows = rows
                .iter()
                .map(|row| {
                    (0..row.len())
                        .map(|i| value_to_json(row.as_ref(i).unwrap_or(&Value::NULL)))
                        .collect()
                })
                .collect();

            Ok(QueryOutput::Rows { columns, rows })
        } else {
            conn.query_drop(sql)
                .await
                .map_err(|e| ExecutionError::Query(e.to_string()))?;
            Ok(QueryOutput::Affected(conn.affected_rows()))
        }
    }

    async fn insert(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> Result<u64, ExecutionError> {
        let placeholders = vec!["?"; values.len()].join(", ");
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        let params: Vec<Value> = values.iter().map(|v| Value::from(v.as_str())).collect();

        let mut conn = self.conn.lock().await;
        conn.exec_drop(statement, params)
            .await
            .map_err(|e| ExecutionError::Query(e.to_string()))?;
        Ok(conn.affected_rows())
    }
}

/// Convert a driver value into JSON for formatting
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::NULL => serde_json::Value::Null,
        Value::Bytes(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
        Value::Int(i) => serde_json::json!(i),
        Value::UInt(u) => serde_json::json!(u),
        Value::Float(f) => serde_json::json!(f),
        Value::Double(d) => serde_json::json!(d),
        Value::Date(year, month, day, 0, 0, 0, 0) => {
            serde_json::Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
        }
        Value::Date(year, month, day, hour, minute, second, _) => {
            serde_json::Value::String(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ))
        }
        Value::Time(negative, days, hours, minutes, seconds, _) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u32::from(*hours) + *days * 24;
            serde_json::Value::String(format!(
                "{}{:02}:{:02}:{:02}",
                sign, total_hours, minutes, seconds
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_values_map_to_json() {
        assert_eq!(value_to_json(&Value::NULL), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::Int(-3)), serde_json::json!(-3));
        assert_eq!(value_to_json(&Value::UInt(42)), serde_json::json!(42));
        assert_eq!(value_to_json(&Value::Double(9.5)), serde_json::json!(9.5));
        assert_eq!(
            value_to_json(&Value::Bytes(b"Alice".to_vec())),
            serde_json::json!("Alice")
        );
    }

    #[test]
    fn dates_render_date_only_at_midnight() {
        assert_eq!(
            value_to_json(&Value::Date(2021, 3, 1, 0, 0, 0, 0)),
            serde_json::json!("2021-03-01")
        );
        assert_eq!(
            value_to_json(&Value::Date(2021, 3, 1, 9, 30, 5, 0)),
            serde_json::json!("2021-03-01 09:30:05")
        );
    }

    #[test]
    fn times_fold_days_into_hours() {
        assert_eq!(
            value_to_json(&Value::Time(false, 1, 2, 5, 0, 0)),
            serde_json::json!("26:05:00")
        );
        assert_eq!(
            value_to_json(&Value::Time(true, 0, 0, 45, 30, 0)),
            serde_json::json!("-00:45:30")
        );
    }
}
