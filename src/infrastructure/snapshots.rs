//! Daily end-of-day snapshot files.
//!
//! A snapshot directory holds one CSV per trading day named `YYYYMMDD.csv`.
//! Every file has a header row with at least `Ticker` and `Price` columns.
//! Files that cannot be read are skipped with a warning so that one bad day
//! never hides the rest of an instrument's history.

use crate::domain::errors::ForecastError;
use crate::domain::ports::PriceHistory;
use crate::domain::types::{PricePoint, PriceSeries};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

pub const TICKER_COLUMN: &str = "Ticker";
pub const PRICE_COLUMN: &str = "Price";

const SNAPSHOT_EXTENSION: &str = "csv";
const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// Cheap summary of a directory listing. Changes when a day is added or
/// removed, or when the newest day is rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFingerprint {
    pub file_count: usize,
    pub newest: Option<PathBuf>,
    pub newest_modified: Option<SystemTime>,
}

/// Parses the trading date from a snapshot file name such as `20240131.csv`.
///
/// The stem must be exactly eight digits, so `20240131.v2.csv` or `2024131.csv`
/// never alias an existing day.
pub fn snapshot_date(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() != 8 || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

struct SnapshotReader {
    reader: csv::Reader<File>,
    ticker_idx: usize,
    price_idx: usize,
}

impl SnapshotReader {
    fn open(path: &Path) -> Result<Self, ForecastError> {
        let malformed = |reason: String| ForecastError::MalformedSnapshot {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            // a short row for one ticker must not hide the rest of the day
            .flexible(true)
            .from_path(path)
            .map_err(|e| malformed(e.to_string()))?;
        let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| malformed(format!("required column '{}' not found", name)))
        };
        let ticker_idx = column(TICKER_COLUMN)?;
        let price_idx = column(PRICE_COLUMN)?;

        Ok(Self {
            reader,
            ticker_idx,
            price_idx,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotDirectory {
    root: PathBuf,
}

impl SnapshotDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot files ascending by date. CSV files without a date in their name are skipped.
    pub fn files(&self) -> Result<Vec<SnapshotFile>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read snapshot directory {:?}", self.root))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list snapshot directory {:?}", self.root))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            match snapshot_date(&path) {
                Some(date) => files.push(SnapshotFile { path, date }),
                None => warn!("Cannot parse a date from {:?}. Skipping this file.", path),
            }
        }

        files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
        Ok(files)
    }

    pub fn fingerprint(&self) -> Result<SnapshotFingerprint> {
        let files = self.files()?;
        let newest = files.last().map(|f| f.path.clone());
        let newest_modified = match &newest {
            Some(path) => Some(
                fs::metadata(path)
                    .and_then(|m| m.modified())
                    .with_context(|| format!("Failed to stat snapshot {:?}", path))?,
            ),
            None => None,
        };

        Ok(SnapshotFingerprint {
            file_count: files.len(),
            newest,
            newest_modified,
        })
    }

    /// Every instrument identifier present in any readable snapshot, sorted.
    pub fn instruments(&self) -> Result<Vec<String>> {
        let mut instruments = BTreeSet::new();

        for file in self.files()? {
            if let Err(e) = Self::collect_tickers(&file.path, &mut instruments) {
                warn!("{}. Skipping this file.", e);
            }
        }

        Ok(instruments.into_iter().collect())
    }

    fn collect_tickers(path: &Path, into: &mut BTreeSet<String>) -> Result<(), ForecastError> {
        let mut snapshot = SnapshotReader::open(path)?;
        for record in snapshot.reader.records() {
            let record = record.map_err(|e| ForecastError::MalformedSnapshot {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            if let Some(ticker) = record.get(snapshot.ticker_idx).filter(|t| !t.is_empty()) {
                into.insert(ticker.to_string());
            }
        }
        Ok(())
    }

    /// Price of `instrument` in one snapshot. Repeated rows keep the first and are logged.
    pub fn read_price(path: &Path, instrument: &str) -> Result<Option<f64>, ForecastError> {
        let malformed = |reason: String| ForecastError::MalformedSnapshot {
            path: path.to_path_buf(),
            reason,
        };

        let mut snapshot = SnapshotReader::open(path)?;
        let mut first: Option<f64> = None;
        let mut duplicates = 0usize;

        for record in snapshot.reader.records() {
            let record = record.map_err(|e| malformed(e.to_string()))?;
            if record.get(snapshot.ticker_idx) != Some(instrument) {
                continue;
            }
            if first.is_some() {
                duplicates += 1;
                continue;
            }

            let raw = record.get(snapshot.price_idx).unwrap_or_default();
            let price = raw
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| malformed(format!("invalid price {:?} for {}", raw, instrument)))?;
            first = Some(price);
        }

        if duplicates > 0 {
            warn!(
                "{:?} lists {} {} more time(s); keeping the first row",
                path, instrument, duplicates
            );
        }
        Ok(first)
    }

    fn price_on(file: &SnapshotFile, instrument: &str) -> Option<f64> {
        match Self::read_price(&file.path, instrument) {
            Ok(price) => price,
            Err(e) => {
                warn!("{}. Skipping this file.", e);
                None
            }
        }
    }
}

impl PriceHistory for SnapshotDirectory {
    fn price_series(&self, instrument: &str) -> Result<PriceSeries> {
        let points: Vec<PricePoint> = self
            .files()?
            .iter()
            .filter_map(|file| {
                Self::price_on(file, instrument).map(|price| PricePoint {
                    date: file.date,
                    price,
                })
            })
            .collect();

        debug!("Loaded {} prices for {}", points.len(), instrument);
        Ok(PriceSeries::new(instrument, points))
    }

    fn recent_prices(&self, instrument: &str, count: usize) -> Result<Vec<f64>> {
        let mut prices = Vec::with_capacity(count);

        // newest first, stop as soon as the window is full
        for file in self.files()?.iter().rev() {
            if prices.len() >= count {
                break;
            }
            if let Some(price) = Self::price_on(file, instrument) {
                prices.push(price);
            }
        }

        prices.reverse();
        Ok(prices)
    }
}
