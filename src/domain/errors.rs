use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building datasets, training and forecasting.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("No model or scaler found for instrument {instrument}")]
    MissingArtifact { instrument: String },

    #[error("Not enough data for instrument {instrument}: need {required} prices, found {available}")]
    InsufficientData {
        instrument: String,
        required: usize,
        available: usize,
    },

    #[error("Malformed snapshot {path:?}: {reason}")]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("An error occurred while processing instrument {instrument}: {reason}")]
    Processing { instrument: String, reason: String },

    #[error("Cannot fit scaler: {0}")]
    InvalidScaler(String),
}

impl ForecastError {
    /// Wraps any lower-level failure with the instrument it happened for.
    pub fn processing(instrument: &str, err: impl std::fmt::Display) -> Self {
        ForecastError::Processing {
            instrument: instrument.to_string(),
            reason: err.to_string(),
        }
    }

    /// Missing artifacts and short histories are reported as "not found" to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ForecastError::MissingArtifact { .. } | ForecastError::InsufficientData { .. }
        )
    }
}
