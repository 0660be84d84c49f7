//! Min-max normalization of a price series into [0, 1].
//!
//! The fitted bounds are the only state and are persisted next to each model.
//! Serving must reuse them as loaded; refitting on the serving window would
//! shift every prediction.

use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    /// Fits the bounds of `prices`.
    pub fn fit(prices: &[f64]) -> Result<Self, ForecastError> {
        if prices.is_empty() {
            return Err(ForecastError::InvalidScaler("empty series".to_string()));
        }
        if let Some(bad) = prices.iter().find(|p| !p.is_finite()) {
            return Err(ForecastError::InvalidScaler(format!(
                "non-finite price {}",
                bad
            )));
        }

        let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { min, max })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// A constant series has no spread to scale by.
    pub fn is_degenerate(&self) -> bool {
        self.range() == 0.0
    }

    /// Maps a price into scaled space. A degenerate scaler maps everything to 0.
    pub fn transform(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.min) / self.range()
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.transform(*v)).collect()
    }

    /// Maps a scaled value back to price. A degenerate scaler always yields `min`.
    pub fn inverse_transform(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }
}
