//! Dataset loading

use crate::error::{DatasetLoadError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// CSV loader for the survey dataset
pub struct DataLoader {
    /// Rows scanned for type inference (None = whole file)
    infer_schema_length: Option<usize>,
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: None,
            delimiter: b',',
        }
    }

    /// Limit how many rows are used for schema inference
    pub fn with_infer_schema_length(mut self, n: Option<usize>) -> Self {
        self.infer_schema_length = n;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a CSV file with a header row.
    ///
    /// A missing file is reported as `NotFound`; every other failure
    /// (permissions, parse errors) as `Malformed` with the cause attached.
    /// Empty cells come back as nulls.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DatasetLoadError::NotFound { path: path.to_path_buf() },
            _ => DatasetLoadError::malformed(format!("{}: {}", path.display(), e)),
        })?;

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| DatasetLoadError::malformed(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded dataset");
        Ok(df)
    }
}
