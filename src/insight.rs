//! Qualitative confidence tier from the decision score

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a sample sits from the decision boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Low,
    Moderate,
    High,
}

impl ConfidenceTier {
    /// `|score| > 1.0` is high, `> 0.5` moderate, anything else low
    pub fn from_score(decision_score: f64) -> Self {
        let distance = decision_score.abs();
        if distance > 1.0 {
            ConfidenceTier::High
        } else if distance > 0.5 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Moderate => "moderate",
            ConfidenceTier::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary handed to the report alongside a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub tier: ConfidenceTier,
    /// Support vectors per class `[Introvert, Extrovert]`
    pub support_vectors: [usize; 2],
}

pub struct InsightSummarizer;

impl InsightSummarizer {
    pub fn summarize(decision_score: f64, support_vectors: [usize; 2]) -> Insight {
        Insight {
            tier: ConfidenceTier::from_score(decision_score),
            support_vectors,
        }
    }
}
