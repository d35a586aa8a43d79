//! The trained pipeline: everything inference needs, built once at startup

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::inference::{PredictionResult, Predictor};
use crate::insight::{Insight, InsightSummarizer};
use crate::preprocessing::{DataPreparer, EncodingTable, PreparedData, Scaler};
use crate::schema::{Answers, FeatureSchema, FeatureVector};
use crate::training::{ClassifierTrainer, TrainedClassifier, TrainingReport};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Prediction plus its qualitative summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub prediction: PredictionResult,
    pub insight: Insight,
}

/// Immutable bundle of encoding table, scaler and classifier.
///
/// Inference only borrows it, so one instance can serve any number of
/// callers, including from several threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    schema: FeatureSchema,
    encoding: EncodingTable,
    scaler: Scaler,
    classifier: TrainedClassifier,
    report: TrainingReport,
    n_raw_rows: usize,
    n_dropped_rows: usize,
}

impl TrainedPipeline {
    /// Load the configured dataset, prepare it and train the classifier
    pub fn train(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let preparer = DataPreparer::new(config);
        let prepared = preparer.prepare(&config.dataset_path)?;
        Self::from_prepared(config, preparer.schema().clone(), prepared)
    }

    /// Same as [`TrainedPipeline::train`] for an in-memory frame
    pub fn train_frame(config: &PipelineConfig, df: &DataFrame) -> Result<Self> {
        config.validate()?;
        let preparer = DataPreparer::new(config);
        let prepared = preparer.prepare_frame(df)?;
        Self::from_prepared(config, preparer.schema().clone(), prepared)
    }

    fn from_prepared(config: &PipelineConfig, schema: FeatureSchema, prepared: PreparedData) -> Result<Self> {
        let trainer = ClassifierTrainer::new(config.svm.clone());
        let (classifier, report) = trainer.train(&prepared.scaler, &prepared.train, &prepared.evaluation)?;

        Ok(Self {
            schema,
            encoding: prepared.encoding,
            scaler: prepared.scaler,
            classifier,
            report,
            n_raw_rows: prepared.n_raw_rows,
            n_dropped_rows: prepared.n_dropped_rows,
        })
    }

    pub fn predictor(&self) -> Predictor<'_> {
        Predictor::new(&self.schema, &self.scaler, &self.classifier)
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult> {
        self.predictor().predict(vector)
    }

    pub fn insight(&self, prediction: &PredictionResult) -> Insight {
        InsightSummarizer::summarize(prediction.decision_score, self.classifier.n_support())
    }

    /// Lay answers out in schema order, coding yes/no through the fitted table
    pub fn vectorize(&self, answers: &Answers) -> Result<FeatureVector> {
        let pairs = self
            .schema
            .features()
            .iter()
            .map(|&feature| {
                let value = match answers.answer(feature) {
                    Some(answer) => self.encoding.encode_answer(feature, answer)?,
                    None => answers.value(feature),
                };
                Ok((feature.column(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureVector::from_pairs(pairs))
    }

    /// Predict and summarize one respondent's answers
    pub fn assess(&self, answers: &Answers) -> Result<Assessment> {
        let prediction = self.predict(&self.vectorize(answers)?)?;
        Ok(Assessment {
            prediction,
            insight: self.insight(&prediction),
        })
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &TrainedClassifier {
        &self.classifier
    }

    /// Rows in the dataset before cleaning
    pub fn n_raw_rows(&self) -> usize {
        self.n_raw_rows
    }

    /// Rows dropped for missing values
    pub fn n_dropped_rows(&self) -> usize {
        self.n_dropped_rows
    }
}
