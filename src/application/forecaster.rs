//! Autoregressive multi-step forecasting.
//!
//! The model only ever predicts one step ahead. Each prediction is pushed onto
//! the end of the window while the oldest value falls off, so later steps are
//! driven more and more by earlier predictions rather than observed prices.
//! Errors compound along the horizon.

use crate::domain::errors::ForecastError;
use crate::domain::ports::{PriceHistory, SequenceModel};
use crate::domain::repositories::ArtifactStore;
use crate::domain::scaler::MinMaxScaler;
use crate::domain::types::{Forecast, HORIZON, WINDOW_SIZE};
use anyhow::{Result, ensure};
use std::collections::VecDeque;
use tracing::debug;

/// Predicts `HORIZON` unscaled prices following `recent`.
///
/// `recent` must hold exactly `WINDOW_SIZE` actual prices, oldest first. It is
/// scaled with the persisted `scaler` and never refitted.
pub fn roll_forward<M>(model: &M, scaler: &MinMaxScaler, recent: &[f64]) -> Result<Vec<f64>>
where
    M: SequenceModel + ?Sized,
{
    ensure!(
        recent.len() == WINDOW_SIZE,
        "forecast window must hold {} prices, got {}",
        WINDOW_SIZE,
        recent.len()
    );

    let mut window: VecDeque<f64> = recent.iter().map(|p| scaler.transform(*p)).collect();
    let mut predicted = Vec::with_capacity(HORIZON);

    for step in 1..=HORIZON {
        let scaled = model.predict_next(window.make_contiguous())?;
        ensure!(
            scaled.is_finite(),
            "{} returned a non-finite value at step {}",
            model.name(),
            step
        );

        predicted.push(scaler.inverse_transform(scaled));

        window.pop_front();
        window.push_back(scaled);
    }

    Ok(predicted)
}

/// Serves forecasts from persisted artifacts and the latest snapshot data.
pub struct Forecaster<'a, H: PriceHistory, S: ArtifactStore> {
    history: &'a H,
    store: &'a S,
}

impl<'a, H: PriceHistory, S: ArtifactStore> Forecaster<'a, H, S> {
    pub fn new(history: &'a H, store: &'a S) -> Self {
        Self { history, store }
    }

    pub fn forecast(&self, instrument: &str) -> Result<Forecast, ForecastError> {
        let pair = self
            .store
            .get(instrument)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?
            .ok_or_else(|| ForecastError::MissingArtifact {
                instrument: instrument.to_string(),
            })?;

        let recent = self
            .history
            .recent_prices(instrument, WINDOW_SIZE)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?;

        if recent.len() < WINDOW_SIZE {
            return Err(ForecastError::InsufficientData {
                instrument: instrument.to_string(),
                required: WINDOW_SIZE,
                available: recent.len(),
            });
        }
        let window = &recent[recent.len() - WINDOW_SIZE..];
        let last_known = window[WINDOW_SIZE - 1];

        debug!(
            "Forecasting {} with {} from last close {}",
            instrument,
            pair.model.name(),
            last_known
        );

        let predicted = roll_forward(&pair.model, &pair.scaler, window)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?;

        Ok(Forecast::new(instrument, last_known, predicted))
    }
}
