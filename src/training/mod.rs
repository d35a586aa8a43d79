//! Model training module
//!
//! Provides the kernel SVM used to separate introverts from extroverts,
//! the trainer that fits it on the scaled training partition, and the
//! evaluation metrics reported afterwards.

mod engine;
mod metrics;
pub mod svm;

pub use engine::{ClassifierTrainer, TrainedClassifier, TrainingReport};
pub use metrics::{ClassificationMetrics, ClassReport};
pub use svm::{Gamma, KernelType, SVMClassifier, SVMConfig};
