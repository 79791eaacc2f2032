//! Natural-language MySQL assistant backed by a local Ollama model

pub mod assistant;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod llm;
pub mod repl;
pub mod translator;
