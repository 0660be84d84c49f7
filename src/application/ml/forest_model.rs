use crate::domain::ports::{SequenceModel, TrainableModel};
use crate::domain::types::WINDOW_SIZE;
use crate::domain::window::TrainingSet;
use anyhow::{Result, anyhow, ensure};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees in the random forest
    pub n_trees: usize,
    /// Maximum depth of trees
    pub max_depth: u16,
    /// Minimum samples required to split an internal node
    pub min_samples_split: usize,
    /// Bootstrap seed, fixed so retraining the same data gives the same model
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 8,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// One-step price regressor backed by a smartcore random forest.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForestModel {
    regressor: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl ForestModel {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl SequenceModel for ForestModel {
    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        ensure!(
            window.len() == WINDOW_SIZE,
            "model expects a window of {} prices, got {}",
            WINDOW_SIZE,
            window.len()
        );

        let input = DenseMatrix::from_2d_vec(&vec![window.to_vec()])
            .map_err(|e| anyhow!("Matrix creation failed: {}", e))?;
        let predictions = self
            .regressor
            .predict(&input)
            .map_err(|e| anyhow!("Prediction failed: {}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| anyhow!("No prediction returned"))
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}

impl TrainableModel for ForestModel {
    type Params = ForestParams;

    fn fit(set: &TrainingSet, params: &ForestParams) -> Result<Self> {
        ensure!(!set.is_empty(), "cannot fit a model without examples");

        let x = DenseMatrix::from_2d_vec(&set.input_rows())
            .map_err(|e| anyhow!("Matrix error: {}", e))?;
        let y = set.target_vec();

        debug!(
            "Training Random Forest Regressor (Samples: {}, Trees: {}, Depth: {}, MinSplit: {})",
            set.len(),
            params.n_trees,
            params.max_depth,
            params.min_samples_split
        );

        let rf_params = RandomForestRegressorParameters::default()
            .with_n_trees(params.n_trees)
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split)
            .with_seed(params.seed);

        let regressor = RandomForestRegressor::fit(&x, &y, rf_params)
            .map_err(|e| anyhow!("Training error: {}", e))?;

        Ok(Self { regressor })
    }
}
