use crate::domain::errors::ForecastError;
use crate::domain::ports::PriceHistory;
use crate::domain::scaler::MinMaxScaler;
use crate::domain::types::{PriceSeries, WINDOW_SIZE};
use crate::domain::window::TrainingSet;
use tracing::debug;

/// Everything training needs for one instrument.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub series: PriceSeries,
    pub scaler: MinMaxScaler,
    pub training_set: TrainingSet,
}

impl Dataset {
    /// Fits the scaler on the whole series and cuts it into windows.
    pub fn from_series(series: PriceSeries) -> Result<Dataset, ForecastError> {
        if series.len() < WINDOW_SIZE + 1 {
            return Err(ForecastError::InsufficientData {
                instrument: series.instrument.clone(),
                required: WINDOW_SIZE + 1,
                available: series.len(),
            });
        }

        let prices = series.prices();
        let scaler = MinMaxScaler::fit(&prices)?;
        let scaled = scaler.transform_all(&prices);
        let training_set =
            TrainingSet::from_scaled(&scaled).ok_or_else(|| ForecastError::InsufficientData {
                instrument: series.instrument.clone(),
                required: WINDOW_SIZE + 1,
                available: scaled.len(),
            })?;

        debug!(
            "Built {} training examples for {} (min={}, max={})",
            training_set.len(),
            series.instrument,
            scaler.min,
            scaler.max
        );

        Ok(Dataset {
            series,
            scaler,
            training_set,
        })
    }
}

/// Turns an instrument's raw price history into scaled, windowed examples.
pub struct DatasetBuilder<'a, H: PriceHistory> {
    history: &'a H,
}

impl<'a, H: PriceHistory> DatasetBuilder<'a, H> {
    pub fn new(history: &'a H) -> Self {
        Self { history }
    }

    pub fn build(&self, instrument: &str) -> Result<Dataset, ForecastError> {
        let series = self
            .history
            .price_series(instrument)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?;

        Dataset::from_series(series)
    }
}
