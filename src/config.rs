use crate::application::ml::ForestParams;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid LOG_FORMAT: {}. Must be 'pretty' or 'json'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_dir: PathBuf,
    pub model_dir: PathBuf,
    pub log_format: LogFormat,
    pub forest: ForestParams,
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}={:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let snapshot_dir =
            PathBuf::from(env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "public/eod_myx".to_string()));
        let model_dir =
            PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "public/models".to_string()));

        let log_format_str = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
        let log_format = LogFormat::from_str(&log_format_str)?;

        let forest = ForestParams::default().with_env_overrides()?;

        Ok(Self {
            snapshot_dir,
            model_dir,
            log_format,
            forest,
        })
    }

    /// Replaces the forest parameters with a TOML file, keeping env overrides on top.
    pub fn load_forest_file(&mut self, path: &Path) -> Result<()> {
        self.forest = ForestParams::from_toml_file(path)?.with_env_overrides()?;
        Ok(())
    }
}

impl ForestParams {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trainer config {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse trainer config {:?}", path))
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        Ok(Self {
            n_trees: parse_env("TRAIN_N_TREES", self.n_trees)?,
            max_depth: parse_env("TRAIN_MAX_DEPTH", self.max_depth)?,
            min_samples_split: parse_env("TRAIN_MIN_SPLIT", self.min_samples_split)?,
            seed: parse_env("TRAIN_SEED", self.seed)?,
        })
    }
}
