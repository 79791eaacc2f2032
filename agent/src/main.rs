use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askdb::assistant::Assistant;
use askdb::config::{Config, Overrides};
use askdb::db::{Database, MySqlClient};
use askdb::error::{ExecutionError, StartupError};
use askdb::llm::{self, OllamaClient};
use askdb::repl;

#[derive(Parser)]
#[command(name = "askdb")]
#[command(about = "Natural-language MySQL assistant backed by a local Ollama model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database host
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT")]
    db_port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD")]
    db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_HOST")]
    ollama_url: Option<String>,

    /// Model to use
    #[arg(long, env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Refuse everything except SELECT statements
    #[arg(long)]
    read_only: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            db_host: self.db_host.clone(),
            db_port: self.db_port,
            db_user: self.db_user.clone(),
            db_password: self.db_password.clone(),
            db_name: self.db_name.clone(),
            llm_url: self.ollama_url.clone(),
            model: self.model.clone(),
            read_only: self.read_only,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question and exit
    Ask {
        /// Natural-language question
        question: String,
    },
    /// Interactive question loop
    Interactive,
    /// Check database and model connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.overrides())?;

    match cli.command {
        Commands::Ask { question } => {
            let assistant = start_assistant(&config).await?;
            repl::run_turn(&assistant, &question).await;
        }
        Commands::Interactive => {
            let assistant = start_assistant(&config).await?;
            repl::run(&assistant).await?;
        }
        Commands::Check => {
            run_check(&config).await;
        }
    }

    Ok(())
}

/// Open both collaborators and probe them; any failure here is fatal
async fn start_assistant(config: &Config) -> Result<Assistant> {
    let llm = OllamaClient::new(&config.llm.url, &config.llm.model);
    let db = MySqlClient::connect(&config.database).await?;

    let count = db
        .probe(&config.schema.table)
        .await
        .map_err(|e| startup_db_error(config, e))?;
    tracing::info!(rows = count, table = %config.schema.table, "database reachable");

    llm::probe(&llm, &config.llm.url).await?;
    tracing::info!(model = %config.llm.model, "model reachable");

    Ok(
        Assistant::new(Box::new(llm), Box::new(db), config.schema.clone())
            .with_read_only(config.execution.read_only),
    )
}

fn startup_db_error(config: &Config, e: ExecutionError) -> StartupError {
    let reason = match e {
        ExecutionError::Query(message) => message,
        other => other.to_string(),
    };
    StartupError::Database {
        host: config.database.host.clone(),
        port: config.database.port,
        reason,
    }
}

// ============================================================================
// Connectivity check
// ============================================================================

async fn run_check(config: &Config) {
    println!("=== Connectivity check ===\n");

    let mut checks_run = 0;
    let mut checks_passed = 0;

    checks_run += 1;
    let db = check_database(config, &mut checks_passed).await;

    if let Some(ref db) = db {
        checks_run += 1;
        check_schema(db, config, &mut checks_passed).await;
    }

    checks_run += 1;
    check_model(config, &mut checks_passed).await;

    println!("\n=== Summary ===");
    println!("Checks: {}/{} passed", checks_passed, checks_run);

    if checks_passed != checks_run {
        std::process::exit(1);
    }
}

fn status(passed: bool) -> &'static str {
    if passed {
        "✓"
    } else {
        "✗"
    }
}

async fn check_database(config: &Config, checks_passed: &mut u32) -> Option<MySqlClient> {
    print!(
        "Database ({}:{}/{}): ",
        config.database.host, config.database.port, config.database.name
    );

    let db = match MySqlClient::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            println!("{} {}", status(false), e);
            return None;
        }
    };

    match db.probe(&config.schema.table).await {
        Ok(count) => {
            println!(
                "{} {} row(s) in {}",
                status(true),
                count,
                config.schema.table
            );
            *checks_passed += 1;
            Some(db)
        }
        Err(e) => {
            println!("{} {}", status(false), e);
            None
        }
    }
}

async fn check_schema(db: &MySqlClient, config: &Config, checks_passed: &mut u32) {
    print!("Schema ({}): ", config.schema.table);

    match db.describe(&config.schema.table).await {
        Ok(columns) => {
            let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
            println!("{} {}", status(true), names.join(", "));
            if names != config.schema.columns {
                println!(
                    "  - configured columns differ: {}",
                    config.schema.columns.join(", ")
                );
            }
            *checks_passed += 1;
        }
        Err(e) => {
            println!("{} {}", status(false), e);
        }
    }
}

async fn check_model(config: &Config, checks_passed: &mut u32) {
    print!("Model ({} at {}): ", config.llm.model, config.llm.url);

    let client = OllamaClient::new(&config.llm.url, &config.llm.model);
    match llm::probe(&client, &config.llm.url).await {
        Ok(()) => {
            println!("{} responding", status(true));
            *checks_passed += 1;
        }
        Err(e) => {
            println!("{} {}", status(false), e);
        }
    }
}
