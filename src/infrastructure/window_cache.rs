//! Read-through cache of recent price windows.
//!
//! Serving a forecast re-reads the newest snapshot files every time. This
//! cache keeps the last window read for each instrument and drops everything
//! as soon as the snapshot directory fingerprint changes, so a cached window
//! always reflects the latest files.

use crate::domain::ports::PriceHistory;
use crate::domain::types::PriceSeries;
use crate::infrastructure::snapshots::{SnapshotDirectory, SnapshotFingerprint};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct CacheState {
    fingerprint: Option<SnapshotFingerprint>,
    windows: HashMap<(String, usize), Vec<f64>>,
    hits: u64,
    misses: u64,
}

pub struct RecentWindowCache {
    snapshots: SnapshotDirectory,
    state: Mutex<CacheState>,
}

impl RecentWindowCache {
    pub fn new(snapshots: SnapshotDirectory) -> Self {
        Self {
            snapshots,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn snapshots(&self) -> &SnapshotDirectory {
        &self.snapshots
    }

    /// Forgets every cached window.
    pub fn invalidate(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fingerprint = None;
            state.windows.clear();
        }
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        self.state
            .lock()
            .map(|s| (s.hits, s.misses))
            .unwrap_or((0, 0))
    }

    pub fn cached_instruments(&self) -> usize {
        self.state.lock().map(|s| s.windows.len()).unwrap_or(0)
    }
}

impl PriceHistory for RecentWindowCache {
    fn price_series(&self, instrument: &str) -> Result<PriceSeries> {
        self.snapshots.price_series(instrument)
    }

    fn recent_prices(&self, instrument: &str, count: usize) -> Result<Vec<f64>> {
        let fingerprint = self.snapshots.fingerprint()?;
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow!("Window cache lock poisoned: {}", e))?;

        if state.fingerprint.as_ref() != Some(&fingerprint) {
            debug!(
                "Snapshot directory changed ({} files), dropping {} cached windows",
                fingerprint.file_count,
                state.windows.len()
            );
            state.windows.clear();
            state.fingerprint = Some(fingerprint);
        }

        let key = (instrument.to_string(), count);
        if let Some(window) = state.windows.get(&key).cloned() {
            state.hits += 1;
            return Ok(window);
        }

        state.misses += 1;
        let window = self.snapshots.recent_prices(instrument, count)?;
        state.windows.insert(key, window.clone());
        Ok(window)
    }
}
