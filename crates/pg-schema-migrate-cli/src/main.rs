//! pg-schema-migrate CLI - one-shot PostgreSQL schema-to-schema migration.

use clap::Parser;
use pg_schema_migrate::{Config, MigrateError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "pg-schema-migrate")]
#[command(about = "Copy tables between PostgreSQL schemas, one transaction per table")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override source schema
    #[arg(long)]
    source_schema: Option<String>,

    /// Override target schema
    #[arg(long)]
    target_schema: Option<String>,

    /// Override naming prefix for target tables, constraints, and sequences
    #[arg(long)]
    prefix: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::FAILURE
        }
    }
}

/// Returns Ok(true) when every table committed, Ok(false) when the run
/// executed but aborted partway.
async fn run() -> Result<bool, MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    // Apply overrides, then re-validate
    if let Some(schema) = cli.source_schema {
        config.source.schema = schema;
    }
    if let Some(schema) = cli.target_schema {
        config.target.schema = schema;
    }
    if let Some(prefix) = cli.prefix {
        config.migration.prefix = prefix;
    }
    config.validate()?;

    let result = Orchestrator::new(config).await?.run().await?;

    if cli.output_json {
        println!("{}", result.to_json()?);
    } else {
        let status_msg = if result.is_success() {
            "Migration completed!"
        } else {
            "Migration failed"
        };
        println!("\n{}", status_msg);
        println!("  Run ID: {}", result.run_id);
        println!("  Duration: {:.2}s", result.duration_seconds);
        println!(
            "  Tables: {}/{}",
            result.tables_committed, result.tables_total
        );
        println!("  Rows: {}", result.rows_copied);
        if let Some(failure) = result.failure() {
            println!(
                "  Error: table {}: {}",
                failure.table,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(result.is_success())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
