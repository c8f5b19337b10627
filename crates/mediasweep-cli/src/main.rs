//! mediasweep: find and delete unused WordPress media from the command line.
//!
//! Reads the same store settings as the server (DATABASE_URL, TABLE_PREFIX,
//! DELETE_BACKEND, ...), from the environment or a `.env` file.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediasweep_cli::{confirm, delete_targets, render_table, OutputFormat};
use mediasweep_core::{AssetId, LogFormat, StoreConfig};
use mediasweep_db::{connect_pool, create_deleter, ContentStore, MySqlContentStore};
use mediasweep_services::{list_unused_media, DeletionService, ReferencePolicy, ReferenceScanner};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mediasweep", about = "Find media library attachments nothing references")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List unused attachments, newest first
    Scan {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show which checks find a reference to one attachment
    Check {
        /// Attachment ID
        id: AssetId,
        /// Comma-separated reference checks to run (default: all)
        #[arg(long)]
        checks: Option<ReferencePolicy>,
    },
    /// Delete attachments
    Delete {
        /// Attachment IDs
        #[arg(required_unless_present = "all_unused", conflicts_with = "all_unused")]
        ids: Vec<AssetId>,
        /// Delete every attachment a fresh scan finds unused
        #[arg(long)]
        all_unused: bool,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let pool = connect_pool(config).await?;
    let deleter = create_deleter(config, pool.clone())?;
    tracing::debug!(backend = deleter.backend(), "Deletion backend ready");
    Ok(Arc::new(MySqlContentStore::new(pool, config, deleter)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = StoreConfig::from_env().context("Invalid store configuration")?;
    let log_format = LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_default());
    mediasweep_infra::init_tracing("info", log_format)?;

    let scanner = ReferenceScanner::default();
    let store = open_store(&config).await?;

    match cli.command {
        Commands::Scan { format } => {
            let rows = list_unused_media(&scanner, store.as_ref()).await?;
            match format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Table => print!("{}", render_table(&rows)),
            }
        }
        Commands::Check { id, checks } => {
            let scanner = ReferenceScanner::new(checks.unwrap_or_default());
            let matches = scanner.explain(id, store.as_ref()).await?;
            print_json(&serde_json::json!({
                "id": id,
                "referenced": !matches.is_empty(),
                "matches": matches,
            }))?;
        }
        Commands::Delete {
            ids,
            all_unused,
            yes,
        } => {
            let targets = delete_targets(&ids, all_unused, &scanner, store.as_ref()).await?;
            if targets.is_empty() {
                println!("Nothing to delete.");
                return Ok(());
            }

            println!("{} attachment(s) selected.", targets.len());
            if !yes
                && !confirm(
                    "Are you sure you want to delete selected media?",
                    io::stdin().lock(),
                )?
            {
                println!("Aborted.");
                return Ok(());
            }

            let report = DeletionService::new()
                .delete_assets(&targets, store.as_ref())
                .await?;
            println!("{}", report.message());
            if !report.failed.is_empty() {
                let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
                eprintln!("Failed: {}", failed.join(", "));
            }
        }
    }

    Ok(())
}
