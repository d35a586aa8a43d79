//! Platt scaling (sigmoid calibration)

use crate::calibration::Calibrator;
use crate::error::{PersonaError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Platt scaling calibrator
///
/// Fits `P(y=1|f) = 1 / (1 + exp(A*f + B))` where `f` is the SVM decision
/// value, using Newton's method with backtracking line search and Platt's
/// smoothed targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlattScaling {
    /// Slope parameter A
    a: Option<f64>,
    /// Intercept parameter B
    b: Option<f64>,
    /// Maximum Newton iterations
    max_iter: usize,
    /// Smallest line search step
    min_step: f64,
    /// Gradient tolerance
    tol: f64,
}

impl PlattScaling {
    pub fn new() -> Self {
        Self {
            a: None,
            b: None,
            max_iter: 100,
            min_step: 1e-10,
            tol: 1e-5,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fitted `(A, B)`
    pub fn parameters(&self) -> Option<(f64, f64)> {
        match (self.a, self.b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Probability of the positive class for one decision value
    pub fn probability(&self, score: f64) -> Result<f64> {
        let (a, b) = self.parameters().ok_or(PersonaError::ModelNotFitted)?;
        Ok(Self::sigmoid_prob(a * score + b))
    }

    /// `1 / (1 + exp(x))`, evaluated without overflow
    fn sigmoid_prob(f_apb: f64) -> f64 {
        if f_apb >= 0.0 {
            (-f_apb).exp() / (1.0 + (-f_apb).exp())
        } else {
            1.0 / (1.0 + f_apb.exp())
        }
    }

    /// Negative log-likelihood at `(a, b)`
    fn objective(scores: &Array1<f64>, targets: &[f64], a: f64, b: f64) -> f64 {
        scores
            .iter()
            .zip(targets)
            .map(|(&f, &t)| {
                let f_apb = f * a + b;
                if f_apb >= 0.0 {
                    t * f_apb + (1.0 + (-f_apb).exp()).ln()
                } else {
                    (t - 1.0) * f_apb + (1.0 + f_apb.exp()).ln()
                }
            })
            .sum()
    }
}

impl Default for PlattScaling {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibrator for PlattScaling {
    fn fit(&mut self, scores: &Array1<f64>, labels: &Array1<f64>) -> Result<()> {
        let n = scores.len();
        if n != labels.len() {
            return Err(PersonaError::TrainingError(
                "scores and labels must have the same length".to_string(),
            ));
        }
        if n == 0 {
            return Err(PersonaError::TrainingError(
                "cannot calibrate on empty input".to_string(),
            ));
        }

        let n_pos = labels.iter().filter(|&&y| y > 0.5).count() as f64;
        let n_neg = n as f64 - n_pos;

        let hi_target = (n_pos + 1.0) / (n_pos + 2.0);
        let lo_target = 1.0 / (n_neg + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y > 0.5 { hi_target } else { lo_target })
            .collect();

        let mut a = 0.0;
        let mut b = ((n_neg + 1.0) / (n_pos + 1.0)).ln();
        let mut fval = Self::objective(scores, &targets, a, b);

        for _ in 0..self.max_iter {
            // Hessian starts at a small ridge so it stays positive definite
            let mut h11 = 1e-12;
            let mut h22 = 1e-12;
            let mut h21 = 0.0;
            let mut g1 = 0.0;
            let mut g2 = 0.0;

            for (&f, &t) in scores.iter().zip(&targets) {
                let p = Self::sigmoid_prob(f * a + b);
                let q = 1.0 - p;
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < self.tol && g2.abs() < self.tol {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= self.min_step {
                let new_a = a + step * da;
                let new_b = b + step * db;
                let new_f = Self::objective(scores, &targets, new_a, new_b);
                if new_f < fval + 1e-4 * step * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    break;
                }
                step /= 2.0;
            }

            if step < self.min_step {
                break;
            }
        }

        self.a = Some(a);
        self.b = Some(b);
        Ok(())
    }

    fn calibrate(&self, scores: &Array1<f64>) -> Result<Array1<f64>> {
        let (a, b) = self.parameters().ok_or(PersonaError::ModelNotFitted)?;
        Ok(scores.mapv(|f| Self::sigmoid_prob(a * f + b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_platt_scaling_basic() {
        let scores = array![-2.0, -1.2, -0.4, 0.3, 1.1, 2.5, -0.1, 0.8];
        let labels = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0];

        let mut calibrator = PlattScaling::new();
        let probs = calibrator.fit_calibrate(&scores, &labels).unwrap();

        assert_eq!(probs.len(), scores.len());
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_positive_scores_map_to_high_probability() {
        let scores = array![-3.0, -2.0, -1.5, -1.0, 1.0, 1.5, 2.0, 3.0];
        let labels = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut calibrator = PlattScaling::new();
        calibrator.fit(&scores, &labels).unwrap();

        let (a, _) = calibrator.parameters().unwrap();
        assert!(a < 0.0, "slope should be negative, got {}", a);
        assert!(calibrator.probability(2.0).unwrap() > 0.8);
        assert!(calibrator.probability(-2.0).unwrap() < 0.2);
    }

    #[test]
    fn test_probability_is_monotonic() {
        let scores = array![-1.0, -0.5, 0.5, 1.0, -0.2, 0.2];
        let labels = array![0.0, 0.0, 1.0, 1.0, 1.0, 0.0];

        let mut calibrator = PlattScaling::new();
        calibrator.fit(&scores, &labels).unwrap();

        let p1 = calibrator.probability(-1.0).unwrap();
        let p2 = calibrator.probability(0.0).unwrap();
        let p3 = calibrator.probability(1.0).unwrap();
        assert!(p1 <= p2 && p2 <= p3);
    }

    #[test]
    fn test_unfitted() {
        let calibrator = PlattScaling::new();
        assert!(matches!(calibrator.probability(0.0), Err(PersonaError::ModelNotFitted)));
    }

    #[test]
    fn test_length_mismatch() {
        let mut calibrator = PlattScaling::new();
        assert!(calibrator.fit(&array![1.0, 2.0], &array![1.0]).is_err());
    }
}
