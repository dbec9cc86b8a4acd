// src/main.rs
mod extractors;
mod pipeline;
mod records;
mod sec_api;
mod storage;
mod utils;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use records::{FraudIncident, SqliteRecordStore};
use sec_api::SecApiClient;
use storage::FsArchive;
use utils::AppError;

/// Archive the narrative sections of 10-K filings made during known accounting frauds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve pending fraud incidents to 10-K filings and archive their sections
    Run(RunArgs),
    /// Load fraud incidents from a JSON array into the record store
    Import(ImportArgs),
}

#[derive(Args, Debug, Clone)]
struct StoreArgs {
    /// SQLite database holding the incident table
    #[arg(long, env = "FRAUD_DB_PATH", default_value = "fraud.db")]
    db_path: PathBuf,

    /// Name of the fraud incident table
    #[arg(long, env = "FRAUD_TABLE")]
    table: String,

    /// Incidents fetched per scan page
    #[arg(long, env = "SCAN_PAGE_SIZE", default_value_t = records::sqlite::DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// sec-api.io API key
    #[arg(long, env = "SEC_API_KEY", hide_env_values = true)]
    sec_api_key: String,

    /// Bucket the archived records are written to
    #[arg(long, env = "ARCHIVE_BUCKET")]
    bucket: String,

    /// Directory the bucket lives under
    #[arg(long, env = "ARCHIVE_ROOT", default_value = "./archive")]
    archive_root: PathBuf,

    /// Base URL of the sec-api.io endpoints
    #[arg(long, env = "SEC_API_URL", default_value = sec_api::client::DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// JSON file containing an array of incidents
    file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments; missing required settings exit here
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Import(args) => import(args),
    }
}

fn open_store(args: &StoreArgs) -> Result<SqliteRecordStore, AppError> {
    if args.page_size == 0 {
        return Err(AppError::Config("page size must be at least 1".to_string()));
    }
    Ok(SqliteRecordStore::open(&args.db_path, &args.table, args.page_size)?)
}

async fn run(args: RunArgs) -> Result<(), AppError> {
    if args.sec_api_key.trim().is_empty() {
        return Err(AppError::Config("SEC_API_KEY is empty".to_string()));
    }
    if args.bucket.trim().is_empty() {
        return Err(AppError::Config("ARCHIVE_BUCKET is empty".to_string()));
    }

    // 3. Initialize resources before any pipeline step
    let store = open_store(&args.store)?;
    let sec = SecApiClient::new(&args.api_url, &args.sec_api_key)?;
    let archive = FsArchive::new(&args.archive_root, &args.bucket)?;

    tracing::info!(
        "Starting run against table {} in {}",
        args.store.table,
        args.store.db_path.display()
    );

    // 4. Main process
    let summary = pipeline::run(&store, &sec, &archive).await?;

    tracing::info!(
        "Processing finished. Incidents: {}, windows: {}, resolved: {}, unmatched: {}, query failures: {}, archived: {}, archive failures: {}",
        summary.incidents,
        summary.windows,
        summary.resolved,
        summary.unmatched,
        summary.failed_windows,
        summary.archived,
        summary.archive_failures
    );

    Ok(())
}

fn import(args: ImportArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.file)?;
    let incidents: Vec<FraudIncident> = serde_json::from_str(&raw)?;
    tracing::info!("Read {} incidents from {}", incidents.len(), args.file.display());

    let store = open_store(&args.store)?;
    store.import(&incidents)?;
    Ok(())
}
