//! File-backed storage for trained model/scaler pairs.
//!
//! Each instrument owns two files in the model directory:
//! `<ID>_model.json` holds the serialized model and `<ID>_scaler.json` holds
//! the scaler bounds plus the SHA-256 of the model bytes it was trained with.
//! Loading recomputes the digest, so a scaler can never be paired with a model
//! from a different training run.

use crate::domain::ports::SequenceModel;
use crate::domain::repositories::{ArtifactPair, ArtifactStore};
use crate::domain::scaler::MinMaxScaler;
use crate::domain::types::TrainingMeta;
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persisted scaler state and the provenance of its model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerRecord {
    pub min: f64,
    pub max: f64,
    pub model_sha256: String,
    pub training: TrainingMeta,
}

impl ScalerRecord {
    pub fn scaler(&self) -> MinMaxScaler {
        MinMaxScaler {
            min: self.min,
            max: self.max,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Atomic write: write to temp file then rename
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)
        .with_context(|| format!("Failed to write temp file {:?}", temp_path))?;
    fs::rename(&temp_path, path).with_context(|| format!("Failed to rename to {:?}", path))?;
    Ok(())
}

pub struct FileArtifactStore<M> {
    dir: PathBuf,
    _model: PhantomData<fn() -> M>,
}

impl<M> FileArtifactStore<M> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _model: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self, instrument: &str) -> PathBuf {
        self.dir.join(format!("{}_model.json", instrument))
    }

    pub fn scaler_path(&self, instrument: &str) -> PathBuf {
        self.dir.join(format!("{}_scaler.json", instrument))
    }

    /// Reads only the scaler record, without touching the model.
    pub fn load_scaler_record(&self, instrument: &str) -> Result<Option<ScalerRecord>> {
        let path = self.scaler_path(instrument);
        if !path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scaler record {:?}", path))?;
        Ok(Some(record))
    }
}

impl<M> ArtifactStore for FileArtifactStore<M>
where
    M: SequenceModel + Serialize + DeserializeOwned,
{
    type Model = M;

    fn contains(&self, instrument: &str) -> bool {
        self.model_path(instrument).exists() && self.scaler_path(instrument).exists()
    }

    fn get(&self, instrument: &str) -> Result<Option<ArtifactPair<M>>> {
        if !self.contains(instrument) {
            return Ok(None);
        }

        let model_path = self.model_path(instrument);
        let model_bytes =
            fs::read(&model_path).with_context(|| format!("Failed to read {:?}", model_path))?;
        let record = self
            .load_scaler_record(instrument)?
            .with_context(|| format!("Scaler for {} disappeared while loading", instrument))?;

        let digest = sha256_hex(&model_bytes);
        if digest != record.model_sha256 {
            bail!(
                "Model {:?} does not match its scaler (sha256 {} != {})",
                model_path,
                digest,
                record.model_sha256
            );
        }

        let model: M = serde_json::from_slice(&model_bytes)
            .with_context(|| format!("Failed to deserialize model {:?}", model_path))?;

        debug!(
            "Loaded artifacts for {} (run {}, {} samples)",
            instrument, record.training.run_id, record.training.samples
        );
        Ok(Some(ArtifactPair {
            model,
            scaler: record.scaler(),
        }))
    }

    fn put(&self, instrument: &str, pair: &ArtifactPair<M>, meta: &TrainingMeta) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create model directory {:?}", self.dir))?;

        let model_bytes = serde_json::to_vec(&pair.model).context("Failed to serialize model")?;
        let record = ScalerRecord {
            min: pair.scaler.min,
            max: pair.scaler.max,
            model_sha256: sha256_hex(&model_bytes),
            training: meta.clone(),
        };
        let record_json =
            serde_json::to_string_pretty(&record).context("Failed to serialize scaler")?;

        // model first: a scaler on disk always has its model next to it
        let model_path = self.model_path(instrument);
        write_atomic(&model_path, &model_bytes)?;
        info!("Model saved for instrument {} at {:?}", instrument, model_path);

        let scaler_path = self.scaler_path(instrument);
        write_atomic(&scaler_path, record_json.as_bytes())?;
        info!("Scaler saved for instrument {} at {:?}", instrument, scaler_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct ConstModel {
        value: f64,
    }

    impl SequenceModel for ConstModel {
        fn predict_next(&self, _window: &[f64]) -> Result<f64> {
            Ok(self.value)
        }

        fn name(&self) -> &str {
            "const"
        }
    }

    fn create_test_store() -> (FileArtifactStore<ConstModel>, PathBuf) {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "eodcast_test_{}_{}_{}_models",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        (FileArtifactStore::new(temp_dir.join("models")), temp_dir)
    }

    fn cleanup_test_dir(temp_dir: PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    fn pair(value: f64) -> ArtifactPair<ConstModel> {
        ArtifactPair {
            model: ConstModel { value },
            scaler: MinMaxScaler {
                min: 0.1 + 0.2,
                max: 7.0 / 3.0,
            },
        }
    }

    #[test]
    fn test_missing_pair_is_none() {
        let (store, temp_dir) = create_test_store();
        assert!(!store.contains("ABC"));
        assert!(store.get("ABC").unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_put_then_get_restores_exact_scaler() {
        let (store, temp_dir) = create_test_store();
        let original = pair(0.42);
        let meta = TrainingMeta::new(Uuid::new_v4(), 17);

        store.put("ABC", &original, &meta).unwrap();
        assert!(store.contains("ABC"));

        let loaded = store.get("ABC").unwrap().unwrap();
        assert_eq!(loaded.model, original.model);
        assert_eq!(loaded.scaler.min.to_bits(), original.scaler.min.to_bits());
        assert_eq!(loaded.scaler.max.to_bits(), original.scaler.max.to_bits());

        let record = store.load_scaler_record("ABC").unwrap().unwrap();
        assert_eq!(record.training, meta);
        assert!(!store.model_path("ABC").with_extension("tmp").exists());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_half_a_pair_is_not_a_pair() {
        let (store, temp_dir) = create_test_store();
        store
            .put("ABC", &pair(1.0), &TrainingMeta::new(Uuid::new_v4(), 1))
            .unwrap();
        fs::remove_file(store.scaler_path("ABC")).unwrap();

        assert!(!store.contains("ABC"));
        assert!(store.get("ABC").unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_swapped_model_is_rejected() {
        let (store, temp_dir) = create_test_store();
        store
            .put("ABC", &pair(1.0), &TrainingMeta::new(Uuid::new_v4(), 1))
            .unwrap();
        store
            .put("XYZ", &pair(2.0), &TrainingMeta::new(Uuid::new_v4(), 1))
            .unwrap();
        fs::copy(store.model_path("XYZ"), store.model_path("ABC")).unwrap();

        let err = store.get("ABC").unwrap_err();
        assert!(err.to_string().contains("does not match"));
        cleanup_test_dir(temp_dir);
    }
}
