//! Database access layer

mod mysql;

pub use mysql::MySqlClient;

use async_trait::async_trait;

use crate::error::ExecutionError;
use crate::translator::SqlAction;

/// Result of executing one statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Rows fetched by a SELECT
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    },
    /// Rows touched by a write statement
    Affected(u64),
}

/// A column as reported by the database
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Trait for database backends
#[async_trait]
pub trait Database: Send + Sync {
    /// Cheap connectivity check, returns the row count of the given table
    async fn probe(&self, table: &str) -> Result<u64, ExecutionError>;

    /// Column listing for diagnostics
    async fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>, ExecutionError>;

    /// Execute one statement, dispatching on the declared action
    async fn execute(&self, action: SqlAction, sql: &str) -> Result<QueryOutput, ExecutionError>;

    /// Parameterized single-row insert for interactively collected values
    async fn insert(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> Result<u64, ExecutionError>;
}
