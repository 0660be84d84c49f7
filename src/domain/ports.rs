use crate::domain::types::PriceSeries;
use crate::domain::window::TrainingSet;
use anyhow::Result;

/// A trained one-step forecaster for a single instrument.
///
/// Input is exactly `WINDOW_SIZE` scaled prices, oldest first. Output is the
/// scaled price of the next period.
pub trait SequenceModel {
    fn predict_next(&self, window: &[f64]) -> Result<f64>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// A model that can be fitted from windowed examples.
pub trait TrainableModel: SequenceModel + Sized {
    type Params;

    fn fit(set: &TrainingSet, params: &Self::Params) -> Result<Self>;
}

/// Read access to per-instrument closing prices.
pub trait PriceHistory {
    /// Full history of `instrument`, ascending by date.
    fn price_series(&self, instrument: &str) -> Result<PriceSeries>;

    /// Up to `count` of the most recent prices of `instrument`, oldest first.
    fn recent_prices(&self, instrument: &str, count: usize) -> Result<Vec<f64>>;
}
