//! Evaluation metrics for the binary classifier

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of true samples of this class
    pub support: usize,
}

/// Metrics over an evaluation partition. Index 0 is Introvert, 1 Extrovert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub per_class: [ClassReport; 2],
    /// `confusion[true][predicted]`
    pub confusion: [[usize; 2]; 2],
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compare true and predicted 0/1 labels
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut confusion = [[0usize; 2]; 2];
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let t = usize::from(*t > 0.5);
            let p = usize::from(*p > 0.5);
            confusion[t][p] += 1;
        }

        let n_samples = y_true.len();
        let correct = confusion[0][0] + confusion[1][1];
        let accuracy = if n_samples > 0 {
            correct as f64 / n_samples as f64
        } else {
            0.0
        };

        let per_class = [Self::class_report(&confusion, 0), Self::class_report(&confusion, 1)];

        Self {
            accuracy,
            per_class,
            confusion,
            n_samples,
        }
    }

    fn class_report(confusion: &[[usize; 2]; 2], class: usize) -> ClassReport {
        let other = 1 - class;
        let tp = confusion[class][class];
        let fp = confusion[other][class];
        let fn_ = confusion[class][other];

        let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
        let recall = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassReport {
            precision,
            recall,
            f1_score,
            support: tp + fn_,
        }
    }
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>8}", "", "precision", "recall", "f1-score", "support")?;
        for (name, r) in ["Introvert", "Extrovert"].iter().zip(self.per_class.iter()) {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>8}",
                name, r.precision, r.recall, r.f1_score, r.support
            )?;
        }
        write!(f, "{:>12} {:>32.2} {:>8}", "accuracy", self.accuracy, self.n_samples)
    }
}
