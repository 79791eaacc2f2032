//! Error types for the assistant
//!
//! Three failure classes: startup connectivity problems are fatal, while
//! translation and execution failures end only the current turn.

use thiserror::Error;

use crate::translator::SqlAction;

/// Connectivity failures detected before the first turn
#[derive(Error, Debug)]
pub enum StartupError {
    /// The database did not answer the startup probe
    #[error("database unreachable at {host}:{port}: {reason}")]
    Database {
        /// Configured database host
        host: String,
        /// Configured database port
        port: u16,
        /// Driver-reported failure
        reason: String,
    },

    /// The model endpoint did not answer the startup probe
    #[error("model endpoint unreachable at {url}: {reason}")]
    Model { url: String, reason: String },

    /// The model endpoint answered the probe with empty text
    #[error("model at {url} returned an empty reply to the probe prompt")]
    EmptyReply { url: String },
}

/// Failures while turning a question into an executable action
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The request to the model endpoint failed
    #[error("model request failed: {0}")]
    Request(String),

    /// The model reply was not a single JSON object
    #[error("model reply is not valid JSON ({source}); raw reply: {raw}")]
    InvalidJson {
        /// Raw reply text, kept verbatim for diagnostics
        raw: String,
        source: serde_json::Error,
    },

    /// The declared action is not one of the recognized SQL verbs
    #[error("model reply uses unrecognized action {action:?}")]
    UnknownAction { action: String, raw: String },

    /// An executable action arrived without SQL
    #[error("model reply declares {action} but carries no SQL")]
    MissingSql { action: SqlAction, raw: String },
}

/// Failures at the database for a validated action
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The statement failed server-side
    #[error("database error: {0}")]
    Query(String),

    /// Write statement refused in read-only mode
    #[error("{0} refused: read-only mode permits SELECT only")]
    ReadOnly(SqlAction),
}

/// Everything that can end a single turn early
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_name_the_endpoint() {
        let err = StartupError::Database {
            host: "localhost".to_string(),
            port: 3306,
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("localhost:3306"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn turn_error_displays_the_inner_failure() {
        let err = TurnError::from(ExecutionError::Query("syntax error".to_string()));
        assert_eq!(err.to_string(), "database error: syntax error");
    }
}
