//! Categorical encoding for yes/no survey columns

use crate::error::{DatasetLoadError, PersonaError, Result};
use crate::schema::{Answer, Feature};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column mapping from raw label to integer code.
///
/// Fitted once from the cleaned dataset and reused verbatim afterwards.
/// Negative labels (`No`, `tidak`) encode to 0 and affirmative ones
/// (`Yes`, `ya`) to 1, which is the same order a sorted label encoder gives
/// for `No`/`Yes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodingTable {
    mappings: BTreeMap<String, BTreeMap<String, u8>>,
}

impl EncodingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit one mapping per categorical feature from the non-null labels in `df`
    pub fn fit(df: &DataFrame, features: impl IntoIterator<Item = Feature>) -> Result<Self> {
        let mut table = Self::new();

        for feature in features {
            let column = df.column(feature.column()).map_err(|_| {
                DatasetLoadError::malformed(format!("missing column '{}'", feature.column()))
            })?;
            let ca = column.as_materialized_series().str().map_err(|_| {
                DatasetLoadError::malformed(format!(
                    "column '{}' must hold text labels, found {}",
                    feature.column(),
                    column.dtype()
                ))
            })?;

            let mut mapping = BTreeMap::new();
            for label in ca.into_iter().flatten() {
                if mapping.contains_key(label) {
                    continue;
                }
                let answer = Answer::parse(label).ok_or_else(|| {
                    DatasetLoadError::malformed(format!(
                        "unrecognized label '{}' in column '{}'",
                        label,
                        feature.column()
                    ))
                })?;
                mapping.insert(label.to_string(), answer.code() as u8);
            }

            table.mappings.insert(feature.column().to_string(), mapping);
        }

        Ok(table)
    }

    /// Replace every fitted column in `df` with its numeric codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (col_name, mapping) in &self.mappings {
            let column = df.column(col_name).map_err(|_| {
                DatasetLoadError::malformed(format!("missing column '{}'", col_name))
            })?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| DatasetLoadError::malformed(e.to_string()))?;

            let codes = ca
                .into_iter()
                .map(|label| match label {
                    Some(l) => mapping.get(l).map(|&c| Some(c as f64)).ok_or_else(|| {
                        DatasetLoadError::malformed(format!(
                            "label '{}' in column '{}' was not seen during fit",
                            l, col_name
                        ))
                    }),
                    None => Ok(None),
                })
                .collect::<std::result::Result<Vec<Option<f64>>, _>>()?;

            result.with_column(Series::new(col_name.as_str().into(), codes))?;
        }

        Ok(result)
    }

    /// Code the fitted table assigned to labels meaning `answer`
    pub fn encode_answer(&self, feature: Feature, answer: Answer) -> Result<f64> {
        let mapping = self.mappings.get(feature.column()).ok_or_else(|| {
            PersonaError::InferenceError(format!("'{}' is not a categorical feature", feature))
        })?;
        mapping
            .iter()
            .find(|(label, _)| Answer::parse(label) == Some(answer))
            .map(|(_, &code)| code as f64)
            .ok_or_else(|| {
                PersonaError::InferenceError(format!(
                    "no {:?} answer for '{}' was seen during fit",
                    answer, feature
                ))
            })
    }

    /// Fitted labels and codes for a column
    pub fn mapping(&self, feature: Feature) -> Option<&BTreeMap<String, u8>> {
        self.mappings.get(feature.column())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey_df() -> DataFrame {
        df!(
            "Stage_fear" => &["No", "Yes", "Yes", "No"],
            "Drained_after_socializing" => &["Yes", "Yes", "No", "No"]
        )
        .unwrap()
    }

    #[test]
    fn test_fit_yes_no() {
        let df = survey_df();
        let table = EncodingTable::fit(&df, [Feature::StageFear, Feature::DrainedAfterSocializing]).unwrap();

        assert_eq!(table.len(), 2);
        let mapping = table.mapping(Feature::StageFear).unwrap();
        assert_eq!(mapping.get("No"), Some(&0));
        assert_eq!(mapping.get("Yes"), Some(&1));
    }

    #[test]
    fn test_transform_replaces_columns() {
        let df = survey_df();
        let table = EncodingTable::fit(&df, [Feature::StageFear]).unwrap();
        let encoded = table.transform(&df).unwrap();

        let codes: Vec<Option<f64>> = encoded
            .column("Stage_fear")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some(0.0), Some(1.0), Some(1.0), Some(0.0)]);
        // untouched column keeps its labels
        assert!(encoded.column("Drained_after_socializing").unwrap().str().is_ok());
    }

    #[test]
    fn test_unknown_label_is_malformed() {
        let df = df!("Stage_fear" => &["No", "Sometimes"]).unwrap();
        let err = EncodingTable::fit(&df, [Feature::StageFear]).unwrap_err();
        assert!(matches!(
            err,
            PersonaError::DatasetLoad(DatasetLoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_numeric_column_is_malformed() {
        let df = df!("Stage_fear" => &[0.0, 1.0]).unwrap();
        assert!(EncodingTable::fit(&df, [Feature::StageFear]).is_err());
    }

    #[test]
    fn test_encode_answer() {
        let table = EncodingTable::fit(&survey_df(), [Feature::StageFear]).unwrap();
        assert_eq!(table.encode_answer(Feature::StageFear, Answer::Affirmative).unwrap(), 1.0);
        assert_eq!(table.encode_answer(Feature::StageFear, Answer::Negative).unwrap(), 0.0);
        assert!(table.encode_answer(Feature::GoingOutside, Answer::Affirmative).is_err());
    }

    #[test]
    fn test_unseen_answer_is_inference_error() {
        let df = df!("Stage_fear" => &["Yes", "yes"]).unwrap();
        let table = EncodingTable::fit(&df, [Feature::StageFear]).unwrap();
        assert!(matches!(
            table.encode_answer(Feature::StageFear, Answer::Negative),
            Err(PersonaError::InferenceError(_))
        ));
    }
}
