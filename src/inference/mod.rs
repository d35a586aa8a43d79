//! Inference for a single respondent
//!
//! Scales one raw feature vector with the training-fitted scaler and asks
//! the trained classifier for a label, a confidence and a decision score.

mod engine;

pub use engine::{PredictionResult, Predictor};
