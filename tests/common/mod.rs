#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use eodcast::application::ml::ForestParams;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Snapshot and model directories under a unique temp root, removed on drop.
pub struct Workspace {
    pub root: PathBuf,
    pub snapshots: PathBuf,
    pub models: PathBuf,
}

impl Workspace {
    pub fn new(tag: &str) -> Self {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "eodcast_it_{}_{}_{}_{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        let snapshots = root.join("eod");
        let models = root.join("models");
        fs::create_dir_all(&snapshots).expect("Failed to create snapshot dir");

        Self {
            root,
            snapshots,
            models,
        }
    }

    /// Writes one snapshot per day starting 2024-01-01, each row `(ticker, price)`.
    pub fn write_days(&self, days: &[Vec<(&str, f64)>]) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (i, rows) in days.iter().enumerate() {
            let date = start + Duration::days(i as i64);
            write_snapshot(&self.snapshots, date, rows);
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

pub fn write_snapshot(dir: &Path, date: NaiveDate, rows: &[(&str, f64)]) {
    let mut content = String::from("Ticker,Price\n");
    for (ticker, price) in rows {
        content.push_str(&format!("{},{}\n", ticker, price));
    }
    fs::write(dir.join(format!("{}.csv", date.format("%Y%m%d"))), content)
        .expect("Failed to write snapshot");
}

/// 1.00, 1.01, ... computed the same way a ledger would print them.
pub fn ramp(len: usize) -> Vec<f64> {
    (0..len).map(|i| (100 + i) as f64 / 100.0).collect()
}

pub fn fast_params() -> ForestParams {
    ForestParams {
        n_trees: 10,
        max_depth: 6,
        ..ForestParams::default()
    }
}
