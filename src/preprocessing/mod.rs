//! Data preparation
//!
//! Turns the raw survey CSV into training material:
//! - Row cleaning (rows with any missing value are dropped, no imputation)
//! - Yes/no label encoding for categorical columns
//! - Seeded train/evaluation split
//! - Standard scaling fitted on the training partition

mod encoder;
mod scaler;
mod split;
mod preparer;

pub use encoder::EncodingTable;
pub use scaler::Scaler;
pub use split::{train_test_split, SplitIndices};
pub use preparer::{DataPreparer, LabeledSet, PreparedData};
