//! Standard (z-score) feature scaling

use crate::error::{PersonaError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-feature `(x - mean) / std`, fitted on the training partition only.
///
/// Uses the population standard deviation. Constant features get a scale
/// of 1.0 so they pass through centered instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Scaler {
    /// Fit means and standard deviations column-wise
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(PersonaError::TrainingError(
                "cannot fit scaler on an empty partition".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PersonaError::TrainingError("empty scaler input".to_string()))?;
        let std = x.std_axis(Axis(0), 0.0);
        for (i, s) in std.iter().enumerate() {
            if *s == 0.0 {
                warn!(feature = i, "Feature has zero variance in training partition");
            }
        }
        let scale = std.mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Scale every row of `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(PersonaError::ShapeError {
                expected: format!("{} columns", self.n_features()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok((x - &self.mean) / &self.scale)
    }

    /// Scale a single raw vector
    pub fn transform_one(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        if x.len() != self.n_features() {
            return Err(PersonaError::ShapeError {
                expected: format!("{} features", self.n_features()),
                actual: format!("{} features", x.len()),
            });
        }
        Ok((&x - &self.mean) / &self.scale)
    }

    /// Map scaled values back to the original units
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(PersonaError::ShapeError {
                expected: format!("{} columns", self.n_features()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(x * &self.scale + &self.mean)
    }
}
