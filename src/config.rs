//! Pipeline configuration

use crate::error::{PersonaError, Result};
use crate::training::{SVMConfig, KernelType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default dataset location, relative to the working directory
pub const DEFAULT_DATASET_PATH: &str = "personality_dataset.csv";

/// Configuration for data preparation and training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV file with the survey answers and `Personality` label
    pub dataset_path: PathBuf,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/evaluation shuffle
    pub random_seed: u64,

    /// Classifier settings
    pub svm: SVMConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            test_size: 0.2,
            random_seed: 42,
            svm: SVMConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            ..Default::default()
        }
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_svm(mut self, svm: SVMConfig) -> Self {
        self.svm = svm;
        self
    }

    /// Check value ranges before any data is touched
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PersonaError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.svm.c <= 0.0 {
            return Err(PersonaError::ConfigError(format!(
                "svm.c must be positive, got {}",
                self.svm.c
            )));
        }
        if self.svm.probability && self.svm.calibration_folds < 2 {
            return Err(PersonaError::ConfigError(format!(
                "svm.calibration_folds must be at least 2, got {}",
                self.svm.calibration_folds
            )));
        }
        if let KernelType::Rbf { gamma } = &self.svm.kernel {
            gamma.validate()?;
        }
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
