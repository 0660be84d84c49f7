//! Repository abstraction for trained artifacts.
//!
//! A trained instrument is a pair of a model and the scaler fitted on the same
//! series. The pair is written once by training and read by every forecast
//! request. Callers own whatever they load; there is no process-wide registry.
//!
//! # Example
//!
//! ```rust,no_run
//! use eodcast::application::ml::forest_model::ForestModel;
//! use eodcast::domain::repositories::ArtifactStore;
//! use eodcast::infrastructure::artifact_store::FileArtifactStore;
//!
//! let store = FileArtifactStore::<ForestModel>::new("public/models");
//! if let Ok(Some(pair)) = store.get("MAYBANK") {
//!     println!("scaler bounds {} .. {}", pair.scaler.min, pair.scaler.max);
//! }
//! ```

use crate::domain::ports::SequenceModel;
use crate::domain::scaler::MinMaxScaler;
use crate::domain::types::TrainingMeta;
use anyhow::Result;

/// A model together with the scaler it was trained against.
#[derive(Debug, Clone)]
pub struct ArtifactPair<M> {
    pub model: M,
    pub scaler: MinMaxScaler,
}

/// Storage for per-instrument artifact pairs.
pub trait ArtifactStore {
    type Model: SequenceModel;

    /// True only when both halves of the pair exist.
    fn contains(&self, instrument: &str) -> bool;

    /// Loads the pair, or `None` when either half is missing.
    fn get(&self, instrument: &str) -> Result<Option<ArtifactPair<Self::Model>>>;

    /// Persists a freshly trained pair.
    fn put(
        &self,
        instrument: &str,
        pair: &ArtifactPair<Self::Model>,
        meta: &TrainingMeta,
    ) -> Result<()>;
}
