//! Natural-language to SQL translation
//!
//! Builds the instruction prompt around the user's question and parses the
//! model's JSON reply into an executable action. Parsing is strict: the
//! reply must be a single JSON object, and a reply that is not gets
//! surfaced with its raw text instead of being repaired.

use std::fmt;

use serde::Deserialize;

use crate::config::SchemaConfig;
use crate::error::TranslationError;

/// SQL verbs the model is allowed to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlAction {
    Select,
    Insert,
    Update,
    Delete,
}

impl SqlAction {
    /// Parse a verb from the model reply, case-insensitively
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.trim().to_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// True for statements that fetch rows instead of modifying them
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Select)
    }
}

impl fmt::Display for SqlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated model reply, ready for execution
#[derive(Debug, Clone)]
pub struct TranslatedAction {
    pub action: SqlAction,
    /// Absent only when the model asked for interactive data collection
    pub sql: Option<String>,
    pub needs_data: bool,
    /// Short confirmation text for the user
    pub response: String,
}

/// Wire shape of the model reply. Extra keys are ignored, absent optional
/// keys fall back instead of failing the parse.
#[derive(Debug, Deserialize)]
struct RawReply {
    action: String,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    needs_data: bool,
    #[serde(default)]
    response: String,
}

/// Build the instruction prompt for one question
pub fn build_prompt(schema: &SchemaConfig, question: &str) -> String {
    let mut prompt = String::from("You are a helpful SQL assistant.\n\nDatabase Info:\n");
    prompt.push_str(&format!("- Table: {}\n", schema.table));
    prompt.push_str(&format!("- Columns: {}\n\n", schema.columns.join(", ")));
    prompt.push_str(&format!("User Request: \"{}\"\n\n", question));
    prompt.push_str(
        "Reply with EXACTLY one JSON object in this format:\n\
         {\n\
           \"action\": \"SELECT|INSERT|UPDATE|DELETE\",\n\
           \"sql\": \"SQL statement or null\",\n\
           \"needs_data\": false,\n\
           \"response\": \"Short confirmation for the user\"\n\
         }\n\n\
         Rules:\n\
         - Use ORDER BY id for SELECTs.\n\
         - Use LIKE '%term%' for searches.\n\
         - For INSERT, set needs_data to true and sql to null if values are missing.\n\
         - Reply with the JSON object only, no other text.\n",
    );
    prompt
}

/// Parse and validate one raw model reply
pub fn parse_reply(raw: &str) -> Result<TranslatedAction, TranslationError> {
    let reply: RawReply =
        serde_json::from_str(raw.trim()).map_err(|source| TranslationError::InvalidJson {
            raw: raw.to_string(),
            source,
        })?;

    let action =
        SqlAction::parse(&reply.action).ok_or_else(|| TranslationError::UnknownAction {
            action: reply.action.clone(),
            raw: raw.to_string(),
        })?;

    let sql = reply.sql.filter(|s| !s.trim().is_empty());
    if sql.is_none() && !reply.needs_data {
        return Err(TranslationError::MissingSql {
            action,
            raw: raw.to_string(),
        });
    }

    Ok(TranslatedAction {
        action,
        sql,
        needs_data: reply.needs_data,
        response: reply.response,
    })
}
