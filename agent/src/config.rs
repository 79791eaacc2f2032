//! Configuration loading

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

const CONFIG_FILENAME: &str = ".askdb.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/askdb/
///
/// Returns the path if found, None otherwise.
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    // Walk up the directory tree
    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break, // Reached filesystem root
        }
    }

    // Fallback: Check global config
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("askdb").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Top-level configuration (from .askdb.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Database connection section
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
}

/// Model endpoint section
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Target table section
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Columns the database fills on its own, skipped during data collection
    #[serde(default = "default_generated")]
    pub generated: Vec<String>,
}

/// Execution policy section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionConfig {
    /// Refuse everything except SELECT statements
    #[serde(default)]
    pub read_only: bool,
}

// Default value functions
fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_db_name() -> String {
    "company".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_table() -> String {
    "employees".to_string()
}

fn default_columns() -> Vec<String> {
    ["id", "name", "role", "department", "salary", "hire_date"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_generated() -> Vec<String> {
    ["id", "hire_date"].iter().map(|s| s.to_string()).collect()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: default_db_name(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            columns: default_columns(),
            generated: default_generated(),
        }
    }
}

impl SchemaConfig {
    /// Columns a user must supply when adding a record
    pub fn insertable_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|&column| !self.generated.contains(column))
            .map(String::as_str)
            .collect()
    }
}

/// Per-invocation overrides (CLI flags and environment variables)
#[derive(Debug, Default)]
pub struct Overrides {
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub llm_url: Option<String>,
    pub model: Option<String>,
    pub read_only: bool,
}

impl Config {
    /// Effective configuration: overrides beat the config file, which beats defaults
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let mut config = Self::load()?;
        config.apply(overrides);
        Ok(config)
    }

    /// Load config from .askdb.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .askdb.toml
    /// 2. Check ~/.config/askdb/.askdb.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        if let Some(config_path) = find_config_file(CONFIG_FILENAME) {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.db_host {
            self.database.host = host;
        }
        if let Some(port) = overrides.db_port {
            self.database.port = port;
        }
        if let Some(user) = overrides.db_user {
            self.database.user = user;
        }
        if let Some(password) = overrides.db_password {
            self.database.password = password;
        }
        if let Some(name) = overrides.db_name {
            self.database.name = name;
        }
        if let Some(url) = overrides.llm_url {
            self.llm.url = url;
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if overrides.read_only {
            self.execution.read_only = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_local_stack() {
        let config = Config::default();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.password, "");
        assert_eq!(config.database.name, "company");
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.schema.table, "employees");
        assert!(!config.execution.read_only);
    }

    #[test]
    fn load_from_path_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[database]
host = "db.internal"
port = 3307

[llm]
model = "qwen2.5-coder"

[execution]
read_only = true
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.user, "root");
        assert_eq!(config.llm.model, "qwen2.5-coder");
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert!(config.execution.read_only);
    }

    #[test]
    fn overrides_beat_file_values() {
        let mut config = Config::default();
        config.apply(Overrides {
            db_host: Some("10.0.0.5".to_string()),
            model: Some("mistral".to_string()),
            read_only: true,
            ..Overrides::default()
        });

        assert_eq!(config.database.host, "10.0.0.5");
        assert_eq!(config.llm.model, "mistral");
        assert!(config.execution.read_only);
        // Everything else keeps its default
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.llm.url, "http://localhost:11434");
    }

    #[test]
    fn insertable_columns_skip_generated_ones() {
        let schema = SchemaConfig::default();
        assert_eq!(
            schema.insertable_columns(),
            vec!["name", "role", "department", "salary"]
        );
    }

    #[test]
    fn custom_schema_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[schema]
table = "projects"
columns = ["id", "title", "owner"]
generated = ["id"]
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.schema.table, "projects");
        assert_eq!(config.schema.insertable_columns(), vec!["title", "owner"]);
    }
}
