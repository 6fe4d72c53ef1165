//! Parquet reader

use std::fs::File;
use std::path::Path;

use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::error::{LoadError, LoadResult};

/// Open a Parquet file as a batch reader with its default batch size
pub(super) fn open(path: &Path) -> LoadResult<ParquetRecordBatchReader> {
    let file = File::open(path).map_err(|e| LoadError::read(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| LoadError::read(path, e))?;

    let metadata = builder.metadata();
    tracing::debug!(
        path = %path.display(),
        row_groups = metadata.num_row_groups(),
        rows = metadata.file_metadata().num_rows(),
        "Opened Parquet file"
    );

    builder.build().map_err(|e| LoadError::read(path, e))
}
