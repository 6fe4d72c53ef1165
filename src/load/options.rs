//! Load options

use crate::source::{DEFAULT_CSV_BATCH_SIZE, ReadOptions};

/// Options for a project or table load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Records per CSV batch
    pub csv_batch_size: usize,
    /// Records sampled for CSV type inference (None = whole file)
    pub csv_infer_rows: Option<usize>,
    /// Validate sources without touching the warehouse
    pub dry_run: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            csv_batch_size: DEFAULT_CSV_BATCH_SIZE,
            csv_infer_rows: None,
            dry_run: false,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CSV batch size (minimum 1)
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.csv_batch_size = size.max(1);
        self
    }

    /// Limit CSV type inference to the first `rows` records
    pub fn with_infer_rows(mut self, rows: Option<usize>) -> Self {
        self.csv_infer_rows = rows;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub(crate) fn read_options(&self) -> ReadOptions {
        ReadOptions {
            batch_size: self.csv_batch_size,
            infer_rows: self.csv_infer_rows,
        }
    }
}
