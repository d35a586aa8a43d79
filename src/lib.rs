//! Persona SVM - introvert/extrovert survey classifier
//!
//! Loads a survey dataset, encodes and scales it, trains a kernel SVM and
//! classifies new respondents with a confidence estimate.
//!
//! # Modules
//!
//! - [`preprocessing`] - Row cleaning, yes/no encoding, seeded split, scaling
//! - [`training`] - SMO-trained SVM, trainer and evaluation metrics
//! - [`calibration`] - Platt scaling for probability estimates
//! - [`inference`] - Single-vector prediction
//! - [`insight`] - Confidence tier from the decision score
//! - [`pipeline`] - Immutable trained bundle used for every prediction
//! - [`cli`] - Interactive questionnaire and report rendering

// Core error handling
pub mod error;
pub mod config;
pub mod schema;

// Core ML modules
pub mod preprocessing;
pub mod calibration;
pub mod training;
pub mod inference;
pub mod insight;
pub mod pipeline;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{DatasetLoadError, PersonaError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DatasetLoadError, PersonaError, Result};
    pub use crate::config::PipelineConfig;
    pub use crate::schema::{Answer, Answers, Feature, FeatureSchema, FeatureVector, Personality};
    pub use crate::preprocessing::{DataPreparer, EncodingTable, PreparedData, Scaler};
    pub use crate::training::{ClassifierTrainer, SVMConfig, KernelType, Gamma, TrainedClassifier, TrainingReport};
    pub use crate::inference::{Predictor, PredictionResult};
    pub use crate::insight::{ConfidenceTier, Insight, InsightSummarizer};
    pub use crate::pipeline::{Assessment, TrainedPipeline};
}
