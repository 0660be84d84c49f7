//! One-shot forecast for a single instrument.
//!
//! Prints the JSON body a serving layer would return:
//! `{"predictions":[{"date":"Day 0","predictedPrice":...}, ...]}` on success,
//! `{"error":"..."}` otherwise (with a non-zero exit code).

use anyhow::Result;
use clap::Parser;
use eodcast::application::ml::ForestModel;
use eodcast::application::service::ForecastService;
use eodcast::config::Config;
use eodcast::infrastructure::observability::init_tracing;
use eodcast::infrastructure::{FileArtifactStore, SnapshotDirectory};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instrument identifier, e.g. MAYBANK
    instrument: String,

    /// Directory of daily YYYYMMDD.csv snapshots (overrides SNAPSHOT_DIR)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Directory of trained models and scalers (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    init_tracing(config.log_format);

    if let Some(dir) = args.snapshot_dir {
        config.snapshot_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }

    let snapshots = SnapshotDirectory::new(&config.snapshot_dir);
    let store = FileArtifactStore::<ForestModel>::new(&config.model_dir);
    let service = ForecastService::new(&snapshots, &store);

    let response = service.handle(&args.instrument);
    info!("Responding with status {}", response.status);

    let body = if args.pretty {
        serde_json::to_string_pretty(&response.body)?
    } else {
        serde_json::to_string(&response.body)?
    };
    println!("{}", body);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
