//! Operator tool for the task-letter store.
//!
//! Usage:
//!
//! ```text
//! errand [--config <path>] <command>
//! ```
//!
//! Commands:
//!
//! - `migrate`: create the `task_letters` table when missing
//! - `list`: print every task letter, newest first
//! - `show <id>`: print one task letter, or `null`
//! - `delete <id>`: delete a task letter and print `{"success": bool}`
//! - `export <id> [--format pdf|docx]`: print the export address
//!
//! Output is JSON on standard output; logs go to standard error.

use clap::{Parser, Subcommand};
use errand::config::ErrandConfig;
use errand::task_letter::{
    adapters::postgres::PostgresTaskLetterRepository,
    domain::{ExportFormat, TaskLetterId},
    services::{DocumentExportService, TaskLetterService},
};
use errand::telemetry::init_tracing;
use mockable::DefaultClock;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "errand", version, about = "Manage official travel task letters")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the task-letter schema when missing.
    Migrate,
    /// List every task letter, newest first.
    List,
    /// Show one task letter.
    Show {
        /// Task-letter identifier.
        id: i64,
    },
    /// Delete one task letter.
    Delete {
        /// Task-letter identifier.
        id: i64,
    },
    /// Resolve the export address of a task letter.
    Export {
        /// Task-letter identifier.
        id: i64,
        /// Document format.
        #[arg(long, short, default_value = "pdf")]
        format: ExportFormat,
    },
}

#[derive(Serialize)]
struct DeleteOutcome {
    success: bool,
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = ErrandConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log.filter)?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(cli.command, &config))
}

async fn run(command: Command, config: &ErrandConfig) -> Result<(), BoxError> {
    let repository = Arc::new(PostgresTaskLetterRepository::connect(
        &config.database.url,
        config.database.max_connections,
    )?);
    let letters = TaskLetterService::new(Arc::clone(&repository), Arc::new(DefaultClock));

    match command {
        Command::Migrate => {
            repository.apply_schema().await?;
            tracing::info!("task letter schema applied");
            Ok(())
        }
        Command::List => print_json(&letters.list_all().await?),
        Command::Show { id } => print_json(&letters.find_by_id(TaskLetterId::new(id)?).await?),
        Command::Delete { id } => {
            let success = letters.delete(TaskLetterId::new(id)?).await?;
            print_json(&DeleteOutcome { success })
        }
        Command::Export { id, format } => {
            let exporter = DocumentExportService::new(repository, config.export.naming());
            print_json(&exporter.export(TaskLetterId::new(id)?, format).await?)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), BoxError> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
