//! Probability calibration
//!
//! Maps raw SVM decision values to class-membership probabilities.

mod platt;

pub use platt::PlattScaling;

use crate::error::Result;
use ndarray::Array1;

/// Trait for score calibrators
pub trait Calibrator: Send + Sync {
    /// Fit on decision values and 0/1 labels
    fn fit(&mut self, scores: &Array1<f64>, labels: &Array1<f64>) -> Result<()>;

    /// Probability of the positive class for each score
    fn calibrate(&self, scores: &Array1<f64>) -> Result<Array1<f64>>;

    /// Fit and calibrate in one step
    fn fit_calibrate(&mut self, scores: &Array1<f64>, labels: &Array1<f64>) -> Result<Array1<f64>> {
        self.fit(scores, labels)?;
        self.calibrate(scores)
    }
}
