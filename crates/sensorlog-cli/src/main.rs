// sensorlog CLI - seed equipment, sensors and sensor logs into SQLite

mod config;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use sensorlog_core::ingest::IngestOptions;
use sensorlog_core::parser::{LogParser, SensorLineParser};
use sensorlog_core::{BatchIngestor, IngestMode};
use sensorlog_store::schema::{self, EQUIPMENT_FAILURE_SENSORS};
use sensorlog_store::{database_check, DatabaseUri, SeedError, SeedOptions, SqliteGateway};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensorlog")]
#[command(version = "0.1.0")]
#[command(about = "Seed equipment, sensor and sensor log data into SQLite", long_about = None)]
struct Cli {
    /// Config file (defaults to ./sensorlog.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URI, e.g. sqlite:///database.sqlite
    #[arg(short, long, env = "DATABASE_URI")]
    database_uri: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and fill any missing tables from the resource directory
    Seed {
        /// Directory with equipment.json, equipment_sensors.csv and the log file
        #[arg(short, long)]
        resource_dir: Option<PathBuf>,

        /// Log load mode (bulk, tolerant)
        #[arg(short, long)]
        mode: Option<IngestMode>,

        /// Parse log lines on all cores before committing
        #[arg(long)]
        parallel: bool,
    },

    /// Ingest a sensor log file into an already seeded database
    Ingest {
        /// Path to log file
        file: PathBuf,

        /// Load mode (bulk, tolerant)
        #[arg(short, long)]
        mode: Option<IngestMode>,

        /// Parse log lines on all cores before committing
        #[arg(long)]
        parallel: bool,
    },

    /// Parse a single log line and print the record
    Parse {
        /// Raw log line
        line: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = config::resolve_config(cli.config.as_deref())?;
    if let Some(uri) = cli.database_uri {
        config.database_uri = uri;
    }

    match cli.command {
        Commands::Seed { resource_dir, mode, parallel } => {
            let options = SeedOptions {
                resource_dir: resource_dir.unwrap_or(config.resource_dir),
                mode: mode.unwrap_or(config.ingest.mode),
                ingest: ingest_options(parallel || config.ingest.parallel_parse)?,
            };
            seed(&config.database_uri, &options)?;
        }
        Commands::Ingest { file, mode, parallel } => {
            let options = ingest_options(parallel || config.ingest.parallel_parse)?;
            ingest_file(&config.database_uri, &file, mode.unwrap_or(config.ingest.mode), options)?;
        }
        Commands::Parse { line } => {
            parse_line(&line)?;
        }
    }

    Ok(())
}

// Ctrl-C stops before the next line or transaction; committed rows stay
fn ingest_options(parallel_parse: bool) -> Result<IngestOptions, Box<dyn std::error::Error>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, stopping after the current line");
        flag.store(true, Ordering::Relaxed);
    })?;

    Ok(IngestOptions {
        parallel_parse,
        cancel: Some(cancel),
    })
}

fn seed(database_uri: &str, options: &SeedOptions) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n{} {}", "🌱 Seeding:".cyan().bold(), database_uri);
    println!("{} {}", "Resources:".dimmed(), options.resource_dir.display());
    println!("{} {:?}", "Log mode:".dimmed(), options.mode);

    let mut conn = database_uri.parse::<DatabaseUri>()?.open()?;
    match database_check(&mut conn, options) {
        Ok(summary) => {
            output::print_summary(&summary);
            Ok(())
        }
        Err(SeedError::Ingest(err)) => abort(&err.to_string()),
        Err(err) => Err(err.into()),
    }
}

fn ingest_file(
    database_uri: &str,
    file: &Path,
    mode: IngestMode,
    options: IngestOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n{} {}", "📥 Ingesting:".cyan().bold(), file.display());
    println!("{} {:?}", "Mode:".dimmed(), mode);
    println!("{}", "─".repeat(40).dimmed());

    let mut conn = database_uri.parse::<DatabaseUri>()?.open()?;
    if !schema::has_table(&conn, EQUIPMENT_FAILURE_SENSORS.name)? {
        return abort("log table is missing, run `sensorlog seed` first");
    }

    let mut ingestor = BatchIngestor::new(SqliteGateway::new(&mut conn)).with_options(options);
    match ingestor.ingest_path(file, mode) {
        Ok(report) => {
            output::print_report(&report);
            Ok(())
        }
        Err(err) => abort(&err.to_string()),
    }
}

fn parse_line(line: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parser = SensorLineParser::new();
    match parser.parse(line) {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(err) => abort(&format!("parse error: {err}")),
    }
}

fn abort(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    process::exit(1);
}
