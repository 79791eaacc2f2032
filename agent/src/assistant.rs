//! Per-turn orchestration
//!
//! One turn runs translate, execute, format, in that order. Nothing is
//! kept between turns: each question starts from a blank slate.

use crate::config::SchemaConfig;
use crate::db::{Database, QueryOutput};
use crate::error::{ExecutionError, TranslationError, TurnError};
use crate::format;
use crate::llm::Llm;
use crate::translator::{self, SqlAction, TranslatedAction};

/// Outcome of one turn
#[derive(Debug)]
pub enum Turn {
    /// Finished, with the text to print
    Answered(String),
    /// The model wants column values collected before an INSERT can run
    NeedsData(TranslatedAction),
}

/// One-question-at-a-time assistant over a model and a database
pub struct Assistant {
    llm: Box<dyn Llm>,
    db: Box<dyn Database>,
    schema: SchemaConfig,
    read_only: bool,
}

impl Assistant {
    /// Create a new assistant
    pub fn new(llm: Box<dyn Llm>, db: Box<dyn Database>, schema: SchemaConfig) -> Self {
        Self {
            llm,
            db,
            schema,
            read_only: false,
        }
    }

    /// Refuse write statements before they reach the database
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Run one full turn for a natural-language question
    pub async fn handle(&self, question: &str) -> Result<Turn, TurnError> {
        let prompt = translator::build_prompt(&self.schema, question);
        tracing::debug!(chars = prompt.len(), "built translation prompt");

        let raw = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| TranslationError::Request(format!("{:#}", e)))?;

        let translated = translator::parse_reply(&raw)?;
        tracing::debug!(
            action = %translated.action,
            needs_data = translated.needs_data,
            "validated model reply"
        );

        if translated.needs_data {
            if self.read_only {
                return Err(ExecutionError::ReadOnly(SqlAction::Insert).into());
            }
            return Ok(Turn::NeedsData(translated));
        }

        let sql = translated.sql.clone().unwrap_or_default();
        let output = self.execute(translated.action, &sql).await?;
        Ok(Turn::Answered(render_turn(&translated, &output)))
    }

    /// Finish a data-collection turn with values for the insertable columns
    pub async fn complete_insert(&self, values: &[String]) -> Result<String, TurnError> {
        let columns: Vec<String> = self
            .schema
            .insertable_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let affected = self.db.insert(&self.schema.table, &columns, values).await?;
        tracing::info!(table = %self.schema.table, affected, "inserted collected record");
        Ok(format::render_affected(affected))
    }

    async fn execute(&self, action: SqlAction, sql: &str) -> Result<QueryOutput, ExecutionError> {
        if self.read_only && !action.is_read() {
            return Err(ExecutionError::ReadOnly(action));
        }

        if !verb_matches(sql, action) {
            tracing::warn!(%action, sql, "SQL verb does not match the declared action");
        }

        self.db.execute(action, sql).await
    }
}

/// Combine the model's confirmation line with the formatted result
fn render_turn(translated: &TranslatedAction, output: &QueryOutput) -> String {
    match output {
        QueryOutput::Rows { .. } => format::render(output),
        QueryOutput::Affected(_) => {
            let summary = format::render(output);
            if translated.response.is_empty() {
                summary
            } else {
                format!("{}\n{}", translated.response, summary)
            }
        }
    }
}

fn verb_matches(sql: &str, action: SqlAction) -> bool {
    sql.trim().to_uppercase().starts_with(action.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_check_ignores_case_and_whitespace() {
        assert!(verb_matches("  select * from employees", SqlAction::Select));
        assert!(verb_matches(
            "DELETE FROM employees WHERE id = 4",
            SqlAction::Delete
        ));
        assert!(!verb_matches(
            "DROP TABLE employees",
            SqlAction::Delete
        ));
    }
}
