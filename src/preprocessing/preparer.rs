//! Dataset preparation: load, clean, encode, split and fit the scaler

use super::encoder::EncodingTable;
use super::scaler::Scaler;
use super::split::train_test_split;
use crate::config::PipelineConfig;
use crate::error::{DatasetLoadError, Result};
use crate::schema::{FeatureSchema, Personality, LABEL_COLUMN};
use crate::utils::DataLoader;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Unscaled feature rows with their class codes (0 = Introvert, 1 = Extrovert)
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSet {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl LabeledSet {
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    fn select(&self, rows: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), rows),
            y: self.y.select(Axis(0), rows),
        }
    }

    /// Number of rows per class, `[introvert, extrovert]`
    pub fn class_counts(&self) -> [usize; 2] {
        let extro = self.y.iter().filter(|&&v| v >= 0.5).count();
        [self.y.len() - extro, extro]
    }
}

/// Everything produced from the raw dataset before training
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub encoding: EncodingTable,
    pub scaler: Scaler,
    pub train: LabeledSet,
    pub evaluation: LabeledSet,
    /// Rows in the file before cleaning
    pub n_raw_rows: usize,
    /// Rows discarded for missing values
    pub n_dropped_rows: usize,
}

impl PreparedData {
    /// Rows that survived cleaning
    pub fn n_usable_rows(&self) -> usize {
        self.train.len() + self.evaluation.len()
    }
}

/// Turns the survey CSV into encoded, split training data
pub struct DataPreparer {
    schema: FeatureSchema,
    test_size: f64,
    random_seed: u64,
    loader: DataLoader,
}

impl DataPreparer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            schema: FeatureSchema::standard(),
            test_size: config.test_size,
            random_seed: config.random_seed,
            loader: DataLoader::new(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Load the dataset at `path` and prepare it
    pub fn prepare(&self, path: impl AsRef<Path>) -> Result<PreparedData> {
        let df = self.loader.load_csv(path)?;
        self.prepare_frame(&df)
    }

    /// Prepare an already-loaded frame
    pub fn prepare_frame(&self, df: &DataFrame) -> Result<PreparedData> {
        let n_raw_rows = df.height();

        let mut columns: Vec<&str> = self.schema.column_names();
        columns.push(LABEL_COLUMN);
        for name in &columns {
            if df.column(name).is_err() {
                return Err(DatasetLoadError::malformed(format!("missing column '{}'", name)).into());
            }
        }

        // any empty cell discards the record, including cells outside the schema
        let df = df.drop_nulls::<String>(None)?;
        let n_dropped_rows = n_raw_rows - df.height();
        let df = df.select(columns.iter().copied())?;
        if n_dropped_rows > 0 {
            debug!(dropped = n_dropped_rows, "Dropped rows with missing values");
        }

        let encoding = EncodingTable::fit(&df, self.schema.categorical())?;
        let df = encoding.transform(&df)?;

        let data = LabeledSet {
            x: self.features_to_array2(&df)?,
            y: Self::encode_labels(&df)?,
        };

        let split = train_test_split(data.len(), self.test_size, self.random_seed)?;
        let train = data.select(&split.train);
        let evaluation = data.select(&split.test);
        debug!(train = train.len(), evaluation = evaluation.len(), "Split dataset");

        let scaler = Scaler::fit(&train.x)?;

        info!(
            raw_rows = n_raw_rows,
            usable_rows = data.len(),
            train_rows = train.len(),
            evaluation_rows = evaluation.len(),
            "Prepared dataset"
        );

        Ok(PreparedData {
            encoding,
            scaler,
            train,
            evaluation,
            n_raw_rows,
            n_dropped_rows,
        })
    }

    /// Map the label column through the fixed Introvert=0 / Extrovert=1 table
    fn encode_labels(df: &DataFrame) -> Result<Array1<f64>> {
        let column = df.column(LABEL_COLUMN)?;
        let ca = column.as_materialized_series().str().map_err(|_| {
            DatasetLoadError::malformed(format!(
                "column '{}' must hold text labels, found {}",
                LABEL_COLUMN,
                column.dtype()
            ))
        })?;

        ca.into_iter()
            .map(|label| {
                let label = label.unwrap_or_default();
                Personality::from_label(label)
                    .map(|p| p.code() as f64)
                    .ok_or_else(|| {
                        DatasetLoadError::malformed(format!("unrecognized personality label '{}'", label))
                            .into()
                    })
            })
            .collect()
    }

    /// Extract schema columns into a row-major matrix
    fn features_to_array2(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let col_data: Vec<Vec<f64>> = self
            .schema
            .features()
            .iter()
            .map(|feature| {
                let series = df.column(feature.column())?.as_materialized_series().clone();
                let as_f64 = series.strict_cast(&DataType::Float64).map_err(|_| {
                    DatasetLoadError::malformed(format!(
                        "column '{}' must be numeric, found {}",
                        feature.column(),
                        series.dtype()
                    ))
                })?;
                let values: Vec<f64> = as_f64.f64()?.into_no_null_iter().collect();
                Ok(values)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let n_rows = df.height();
        Ok(Array2::from_shape_fn((n_rows, col_data.len()), |(r, c)| col_data[c][r]))
    }
}
