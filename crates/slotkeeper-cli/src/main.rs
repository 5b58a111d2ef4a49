//! Slotkeeper CLI: drive the file slot lifecycle from the command line.
//!
//! Configuration comes from SLOTKEEPER_* environment variables (or `.env`),
//! overridable with global flags.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use slotkeeper::{FileSlotManager, ManagerConfig, RawUpload, RecordContext};
use slotkeeper_cli::{configure, init_tracing, parse_assignment, Overrides};

#[derive(Parser)]
#[command(name = "slotkeeper", about = "Upload file lifecycle manager")]
struct Cli {
    /// Storage directory (overrides SLOTKEEPER_STORAGE_DIR)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    /// Rename policy: none, md5, sha256, slug, random
    #[arg(long, global = true)]
    policy: Option<String>,
    /// Public base URL of stored files
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a local file in a slot, replacing its previous file
    Ingest {
        /// Slot to store the file in
        #[arg(long)]
        slot: String,
        /// File to ingest
        file: PathBuf,
        /// Stored name currently held by the slot
        #[arg(long)]
        previous: Option<String>,
        /// Identifier of the owning record
        #[arg(long)]
        record_id: Option<String>,
    },
    /// Show the stored name a file would get, without writing anything
    Name {
        /// Original filename
        filename: String,
    },
    /// Delete the stored files of a destroyed record
    Purge {
        /// Stored files as SLOT=NAME, repeatable
        #[arg(long = "stored", required = true)]
        stored: Vec<String>,
        /// Identifier of the owning record
        #[arg(long)]
        record_id: Option<String>,
    },
}

#[derive(Serialize)]
struct IngestOutput {
    slot: String,
    stored_name: Option<String>,
    result: slotkeeper::CommitResult,
    path: Option<String>,
    url: Option<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn record_context(record_id: Option<String>) -> RecordContext {
    record_id.map(RecordContext::with_id).unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let base = ManagerConfig::from_env().context("Failed to load SLOTKEEPER_* configuration")?;
    let overrides = Overrides {
        storage_directory: cli.dir,
        rename_policy: cli.policy,
        base_url: cli.base_url,
    };

    match cli.command {
        Commands::Ingest {
            slot,
            file,
            previous,
            record_id,
        } => {
            let config = configure(base, overrides, std::slice::from_ref(&slot))?;
            let mut manager = FileSlotManager::builder(config).bind()?;
            let record = record_context(record_id);

            if let Some(previous) = previous {
                manager.capture_baseline(&record, [(slot.as_str(), previous.as_str())]);
            }

            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let upload = RawUpload::from_filename(&filename, data);

            let stored_name = manager.prepare_ingest(&slot, Some(upload), &record)?;
            let result = manager.commit_ingest(&slot).await?;

            print_json(&IngestOutput {
                path: manager.stored_path(&slot)?,
                url: manager.file_url(&slot)?,
                slot,
                stored_name,
                result,
            })?;
        }
        Commands::Name { filename } => {
            let slot = "file".to_string();
            let config = configure(base, overrides, std::slice::from_ref(&slot))?;
            let mut manager = FileSlotManager::builder(config).bind()?;

            let upload = RawUpload::from_filename(&filename, Vec::<u8>::new());
            let stored_name = manager.prepare_ingest(&slot, Some(upload), &RecordContext::new())?;
            println!("{}", stored_name.unwrap_or_default());
        }
        Commands::Purge { stored, record_id } => {
            let assignments = stored
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let slots: Vec<String> = assignments.iter().map(|(slot, _)| slot.clone()).collect();

            let config = configure(base, overrides, &slots)?;
            let mut manager = FileSlotManager::builder(config).bind()?;
            let record = record_context(record_id);

            manager.capture_baseline(&record, assignments.iter().map(|(s, n)| (s, n)));
            let result = manager.purge_all(&record).await;
            print_json(&result)?;

            if !result.is_success() {
                anyhow::bail!("{} file(s) could not be deleted", result.failures().count());
            }
        }
    }

    Ok(())
}
