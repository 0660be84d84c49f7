//! Offline trainer.
//!
//! Trains one model per instrument found in the snapshot directory and stores
//! the model/scaler pair in the model directory. Instruments that already
//! have a pair are skipped.
//!
//! # Usage
//! ```sh
//! SNAPSHOT_DIR=public/eod_myx MODEL_DIR=public/models cargo run --bin train
//! cargo run --bin train -- --instrument MAYBANK,TENAGA --config trainer.toml
//! ```

use anyhow::Result;
use clap::Parser;
use eodcast::application::ml::ForestModel;
use eodcast::application::trainer::Trainer;
use eodcast::config::Config;
use eodcast::infrastructure::observability::init_tracing;
use eodcast::infrastructure::{FileArtifactStore, SnapshotDirectory};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of daily YYYYMMDD.csv snapshots (overrides SNAPSHOT_DIR)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Directory for trained models and scalers (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Only train these instruments (comma separated). Default: every instrument found.
    #[arg(short, long, value_delimiter = ',')]
    instrument: Vec<String>,

    /// TOML file with forest hyperparameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trees in the random forest
    #[arg(long)]
    n_trees: Option<usize>,

    /// Maximum depth of trees
    #[arg(long)]
    max_depth: Option<u16>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    init_tracing(config.log_format);

    if let Some(path) = &args.config {
        config.load_forest_file(path)?;
    }
    if let Some(dir) = args.snapshot_dir {
        config.snapshot_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }
    if let Some(n_trees) = args.n_trees {
        config.forest.n_trees = n_trees;
    }
    if let Some(max_depth) = args.max_depth {
        config.forest.max_depth = max_depth;
    }

    info!(
        "Trainer {} starting: snapshots={:?}, models={:?}, params={:?}",
        env!("CARGO_PKG_VERSION"),
        config.snapshot_dir,
        config.model_dir,
        config.forest
    );

    let snapshots = SnapshotDirectory::new(&config.snapshot_dir);
    let store = FileArtifactStore::<ForestModel>::new(&config.model_dir);

    let instruments = if args.instrument.is_empty() {
        snapshots.instruments()?
    } else {
        args.instrument
    };
    info!("{} instruments to process", instruments.len());

    let trainer = Trainer::new(&snapshots, &store, config.forest.clone());
    let report = trainer.train_all(&instruments);

    println!("Training run {}", trainer.run_id());
    println!("  Trained:      {}", report.trained.len());
    println!("  Skipped:      {}", report.skipped.len());
    println!("  Insufficient: {}", report.insufficient.len());
    println!("  Failed:       {}", report.failed.len());
    for (instrument, reason) in &report.failed {
        println!("    {}: {}", instrument, reason);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
