//! Classifier training and evaluation

use super::metrics::ClassificationMetrics;
use super::svm::{SVMClassifier, SVMConfig};
use crate::error::{PersonaError, Result};
use crate::preprocessing::{LabeledSet, Scaler};
use crate::schema::Personality;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// A fitted SVM. Read-only after training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedClassifier {
    model: SVMClassifier,
}

impl TrainedClassifier {
    /// Wrap an already fitted model
    pub fn from_model(model: SVMClassifier) -> Result<Self> {
        if !model.is_fitted() {
            return Err(PersonaError::ModelNotFitted);
        }
        Ok(Self { model })
    }

    /// Signed score for one scaled sample; positive is the Extrovert side
    pub fn decision_score(&self, scaled: ArrayView1<f64>) -> Result<f64> {
        self.model.decision_value(scaled)
    }

    /// Predicted class for one scaled sample
    pub fn predict_label(&self, scaled: ArrayView1<f64>) -> Result<Personality> {
        let score = self.decision_score(scaled)?;
        Ok(if score >= 0.0 {
            Personality::Extrovert
        } else {
            Personality::Introvert
        })
    }

    /// `[P(Introvert), P(Extrovert)]` for one scaled sample
    pub fn probabilities(&self, scaled: ArrayView1<f64>) -> Result<[f64; 2]> {
        let x = scaled.to_owned().insert_axis(Axis(0));
        let proba = self.model.predict_proba(&x)?;
        Ok([proba[[0, 0]], proba[[0, 1]]])
    }

    /// Predicted class codes for a scaled matrix
    pub fn predict(&self, scaled: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict(scaled)
    }

    /// Support vectors per class `[Introvert, Extrovert]`
    pub fn n_support(&self) -> [usize; 2] {
        self.model.n_support()
    }

    pub fn kernel_name(&self) -> &'static str {
        self.model.config().kernel.name()
    }

    pub fn gamma(&self) -> Option<f64> {
        self.model.gamma()
    }

    pub fn model(&self) -> &SVMClassifier {
        &self.model
    }
}

/// Diagnostic summary of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Fraction of evaluation rows predicted correctly
    pub accuracy: f64,
    pub kernel: String,
    pub gamma: Option<f64>,
    /// Support vectors per class `[Introvert, Extrovert]`
    pub support_vectors: [usize; 2],
    pub metrics: ClassificationMetrics,
    pub n_train: usize,
    pub n_evaluation: usize,
    pub training_time_secs: f64,
}

/// Fits the SVM on the scaled training partition and scores it on the evaluation partition
pub struct ClassifierTrainer {
    config: SVMConfig,
}

impl ClassifierTrainer {
    pub fn new(config: SVMConfig) -> Self {
        Self { config }
    }

    pub fn train(
        &self,
        scaler: &Scaler,
        train: &LabeledSet,
        evaluation: &LabeledSet,
    ) -> Result<(TrainedClassifier, TrainingReport)> {
        let start = Instant::now();

        let x_train = scaler.transform(&train.x).map_err(Self::as_training_error)?;
        let x_eval = scaler.transform(&evaluation.x).map_err(Self::as_training_error)?;

        let mut model = SVMClassifier::new(self.config.clone());
        model.fit(&x_train, &train.y).map_err(Self::as_training_error)?;
        let classifier = TrainedClassifier::from_model(model)?;

        let y_pred = classifier.predict(&x_eval).map_err(Self::as_training_error)?;
        let metrics = ClassificationMetrics::compute(&evaluation.y, &y_pred);

        let report = TrainingReport {
            accuracy: metrics.accuracy,
            kernel: classifier.kernel_name().to_string(),
            gamma: classifier.gamma(),
            support_vectors: classifier.n_support(),
            metrics,
            n_train: train.len(),
            n_evaluation: evaluation.len(),
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            accuracy = report.accuracy,
            kernel = %report.kernel,
            introvert_sv = report.support_vectors[0],
            extrovert_sv = report.support_vectors[1],
            "SVM trained"
        );

        Ok((classifier, report))
    }

    fn as_training_error(err: PersonaError) -> PersonaError {
        match err {
            PersonaError::TrainingError(_) => err,
            other => PersonaError::TrainingError(other.to_string()),
        }
    }
}
