//! Survey feature schema shared by training and inference
//!
//! The column names and their order are a fixed contract: the dataset header
//! must carry them, and every inference request must present them in the
//! same order.

use crate::error::{PersonaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the label column in the dataset
pub const LABEL_COLUMN: &str = "Personality";

/// Semantic type of a survey feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Real-valued within a documented range
    Continuous { min: f64, max: f64 },
    /// Whole counts within a documented range
    Discrete { min: u32, max: u32 },
    /// Yes/no answer, encoded 1/0
    Binary,
}

/// One of the seven survey features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    TimeSpentAlone,
    StageFear,
    SocialEventAttendance,
    GoingOutside,
    DrainedAfterSocializing,
    FriendsCircleSize,
    PostFrequency,
}

impl Feature {
    /// All features in schema order
    pub const ALL: [Feature; 7] = [
        Feature::TimeSpentAlone,
        Feature::StageFear,
        Feature::SocialEventAttendance,
        Feature::GoingOutside,
        Feature::DrainedAfterSocializing,
        Feature::FriendsCircleSize,
        Feature::PostFrequency,
    ];

    /// Dataset column name
    pub fn column(&self) -> &'static str {
        match self {
            Feature::TimeSpentAlone => "Time_spent_Alone",
            Feature::StageFear => "Stage_fear",
            Feature::SocialEventAttendance => "Social_event_attendance",
            Feature::GoingOutside => "Going_outside",
            Feature::DrainedAfterSocializing => "Drained_after_socializing",
            Feature::FriendsCircleSize => "Friends_circle_size",
            Feature::PostFrequency => "Post_frequency",
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::TimeSpentAlone => FeatureKind::Continuous { min: 0.0, max: 24.0 },
            Feature::StageFear | Feature::DrainedAfterSocializing => FeatureKind::Binary,
            Feature::SocialEventAttendance => FeatureKind::Discrete { min: 0, max: 30 },
            Feature::GoingOutside => FeatureKind::Discrete { min: 0, max: 20 },
            Feature::FriendsCircleSize | Feature::PostFrequency => {
                FeatureKind::Discrete { min: 0, max: 50 }
            }
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind(), FeatureKind::Binary)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Ordered list of features used by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    features: Vec<Feature>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureSchema {
    /// The seven-field survey schema
    pub fn standard() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.column()).collect()
    }

    /// Features that need a categorical encoding
    pub fn categorical(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied().filter(|f| f.is_categorical())
    }

    /// Reject vectors whose field count or order differs from the schema
    pub fn check(&self, vector: &FeatureVector) -> Result<()> {
        if vector.len() != self.len() {
            return Err(PersonaError::InferenceError(format!(
                "expected {} features, got {}",
                self.len(),
                vector.len()
            )));
        }

        for (i, (expected, actual)) in self.features.iter().zip(vector.names()).enumerate() {
            if expected.column() != actual {
                return Err(PersonaError::InferenceError(format!(
                    "feature {} must be '{}', got '{}'",
                    i,
                    expected.column(),
                    actual
                )));
            }
        }

        Ok(())
    }
}

/// The two personality classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Introvert,
    Extrovert,
}

impl Personality {
    /// Parse the dataset label. Only the exact strings are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Introvert" => Some(Personality::Introvert),
            "Extrovert" => Some(Personality::Extrovert),
            _ => None,
        }
    }

    /// Numeric class code: Introvert = 0, Extrovert = 1
    pub fn code(&self) -> u8 {
        match self {
            Personality::Introvert => 0,
            Personality::Extrovert => 1,
        }
    }

    pub fn from_code(code: f64) -> Self {
        if code >= 0.5 {
            Personality::Extrovert
        } else {
            Personality::Introvert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Introvert => "Introvert",
            Personality::Extrovert => "Extrovert",
        }
    }

    /// Short trait descriptions shown alongside a verdict
    pub fn traits(&self) -> &'static [&'static str] {
        match self {
            Personality::Introvert => &[
                "More comfortable with time alone",
                "Tends to keep a small but close circle of friends",
                "Needs time to recharge after socializing",
                "Prefers quiet, in-depth activities",
            ],
            Personality::Extrovert => &[
                "Energetic in social situations",
                "Enjoys meeting new people and sharing experiences",
                "Tends to be expressive and open",
                "Gains energy from interacting with others",
            ],
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A yes/no survey answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Affirmative,
    Negative,
}

impl Answer {
    /// Parse `ya`, `yes`, `tidak` or `no` (case-insensitive, trimmed)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "ya" | "yes" => Some(Answer::Affirmative),
            "tidak" | "no" => Some(Answer::Negative),
            _ => None,
        }
    }

    pub fn code(&self) -> f64 {
        match self {
            Answer::Affirmative => 1.0,
            Answer::Negative => 0.0,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Affirmative)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_yes() { "yes" } else { "no" })
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Answer::parse(s).ok_or_else(|| "answer ya, yes, tidak or no".to_string())
    }
}

/// One respondent's already-validated answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    pub time_spent_alone: f64,
    pub stage_fear: Answer,
    pub social_event_attendance: u32,
    pub going_outside: u32,
    pub drained_after_socializing: Answer,
    pub friends_circle_size: u32,
    pub post_frequency: u32,
}

impl Answers {
    /// The yes/no answer for a binary feature
    pub fn answer(&self, feature: Feature) -> Option<Answer> {
        match feature {
            Feature::StageFear => Some(self.stage_fear),
            Feature::DrainedAfterSocializing => Some(self.drained_after_socializing),
            _ => None,
        }
    }

    /// Numeric value of a feature; binary answers use their canonical code
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::TimeSpentAlone => self.time_spent_alone,
            Feature::StageFear => self.stage_fear.code(),
            Feature::SocialEventAttendance => self.social_event_attendance as f64,
            Feature::GoingOutside => self.going_outside as f64,
            Feature::DrainedAfterSocializing => self.drained_after_socializing.code(),
            Feature::FriendsCircleSize => self.friends_circle_size as f64,
            Feature::PostFrequency => self.post_frequency as f64,
        }
    }
}

/// A single unlabeled record: named values in the caller's order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (names, values) = pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        Self { names, values }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
