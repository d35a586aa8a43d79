//! Single-vector prediction

use crate::error::{PersonaError, Result};
use crate::preprocessing::Scaler;
use crate::schema::{FeatureSchema, FeatureVector, Personality};
use crate::training::TrainedClassifier;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of classifying one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Personality,
    /// Larger of the two class-membership probabilities, in [0, 1]
    pub confidence: f64,
    /// Signed distance to the boundary; positive is the Extrovert side
    pub decision_score: f64,
    /// `[P(Introvert), P(Extrovert)]`
    pub probabilities: [f64; 2],
}

/// Applies a fitted scaler and classifier to new vectors
pub struct Predictor<'a> {
    schema: &'a FeatureSchema,
    scaler: &'a Scaler,
    classifier: &'a TrainedClassifier,
}

impl<'a> Predictor<'a> {
    pub fn new(schema: &'a FeatureSchema, scaler: &'a Scaler, classifier: &'a TrainedClassifier) -> Self {
        Self {
            schema,
            scaler,
            classifier,
        }
    }

    /// Classify one vector. Any schema, transform or model failure is an
    /// `InferenceError`; nothing is retried.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult> {
        self.schema.check(vector)?;

        let raw = ArrayView1::from(vector.values());
        let scaled = self.scaler.transform_one(raw).map_err(Self::as_inference_error)?;

        let label = self
            .classifier
            .predict_label(scaled.view())
            .map_err(Self::as_inference_error)?;
        let decision_score = self
            .classifier
            .decision_score(scaled.view())
            .map_err(Self::as_inference_error)?;
        let probabilities = self
            .classifier
            .probabilities(scaled.view())
            .map_err(Self::as_inference_error)?;
        let confidence = probabilities[0].max(probabilities[1]);

        debug!(label = %label, confidence, decision_score, "Prediction");

        Ok(PredictionResult {
            label,
            confidence,
            decision_score,
            probabilities,
        })
    }

    fn as_inference_error(err: PersonaError) -> PersonaError {
        match err {
            PersonaError::InferenceError(_) => err,
            other => PersonaError::InferenceError(other.to_string()),
        }
    }
}
