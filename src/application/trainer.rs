//! Offline training loop.
//!
//! Instruments are trained one after another. An instrument that already has
//! an artifact pair is skipped, and a failure on one instrument is recorded
//! without stopping the rest of the run.

use crate::application::dataset::DatasetBuilder;
use crate::domain::errors::ForecastError;
use crate::domain::ports::{PriceHistory, TrainableModel};
use crate::domain::repositories::{ArtifactPair, ArtifactStore};
use crate::domain::types::TrainingMeta;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    Trained { samples: usize },
    Skipped,
}

/// Per-run tally of what happened to each instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub trained: Vec<String>,
    pub skipped: Vec<String>,
    pub insufficient: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl TrainingReport {
    pub fn total(&self) -> usize {
        self.trained.len() + self.skipped.len() + self.insufficient.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub struct Trainer<'a, H, S>
where
    H: PriceHistory,
    S: ArtifactStore,
    S::Model: TrainableModel,
{
    history: &'a H,
    store: &'a S,
    params: <S::Model as TrainableModel>::Params,
    run_id: Uuid,
}

impl<'a, H, S> Trainer<'a, H, S>
where
    H: PriceHistory,
    S: ArtifactStore,
    S::Model: TrainableModel,
{
    pub fn new(history: &'a H, store: &'a S, params: <S::Model as TrainableModel>::Params) -> Self {
        Self {
            history,
            store,
            params,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Trains and persists the pair for one instrument unless it already exists.
    pub fn train_instrument(&self, instrument: &str) -> Result<TrainOutcome, ForecastError> {
        if self.store.contains(instrument) {
            info!(
                "Model and scaler for instrument '{}' already exist. Skipping.",
                instrument
            );
            return Ok(TrainOutcome::Skipped);
        }

        info!("Processing instrument: {}", instrument);
        let dataset = DatasetBuilder::new(self.history).build(instrument)?;
        let samples = dataset.training_set.len();

        let model = <S::Model as TrainableModel>::fit(&dataset.training_set, &self.params)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?;

        let pair = ArtifactPair {
            model,
            scaler: dataset.scaler,
        };
        let meta = TrainingMeta::new(self.run_id, samples);
        self.store
            .put(instrument, &pair, &meta)
            .map_err(|e| ForecastError::processing(instrument, format!("{:#}", e)))?;

        info!(
            "Model and scaler saved for instrument {} ({} samples)",
            instrument, samples
        );
        Ok(TrainOutcome::Trained { samples })
    }

    /// Trains every instrument in order, isolating failures per instrument.
    pub fn train_all<I, T>(&self, instruments: I) -> TrainingReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut report = TrainingReport::default();

        for instrument in instruments {
            let instrument = instrument.as_ref();
            match self.train_instrument(instrument) {
                Ok(TrainOutcome::Trained { .. }) => report.trained.push(instrument.to_string()),
                Ok(TrainOutcome::Skipped) => report.skipped.push(instrument.to_string()),
                Err(e @ ForecastError::InsufficientData { .. }) => {
                    warn!("{}. Skipping.", e);
                    report.insufficient.push(instrument.to_string());
                }
                Err(e) => {
                    error!("Training failed for instrument {}: {}", instrument, e);
                    report.failed.push((instrument.to_string(), e.to_string()));
                }
            }
        }

        info!(
            "Training run {} finished: {} trained, {} skipped, {} insufficient, {} failed",
            self.run_id,
            report.trained.len(),
            report.skipped.len(),
            report.insufficient.len(),
            report.failed.len()
        );
        report
    }
}
