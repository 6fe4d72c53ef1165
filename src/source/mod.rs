//! Source file readers
//!
//! A source file is opened as an ordered stream of Arrow record batches.
//! Two formats are supported:
//! - delimited text (`.csv`), read in fixed-size record chunks
//! - columnar batches (`.parquet`, `.pq`), read with the reader's own batch boundaries

mod csv;
mod parquet;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{LoadError, LoadResult};

/// Default number of CSV records per batch
pub const DEFAULT_CSV_BATCH_SIZE: usize = 100_000;

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated text with optional header row
    DelimitedText,
    /// Parquet files
    ColumnarBatch,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(SourceFormat::DelimitedText),
            "parquet" | "pq" => Ok(SourceFormat::ColumnarBatch),
            _ => Err(LoadError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::DelimitedText => write!(f, "csv"),
            SourceFormat::ColumnarBatch => write!(f, "parquet"),
        }
    }
}

/// Reader tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Records per CSV batch
    pub batch_size: usize,
    /// Records sampled for CSV type inference (None = whole file)
    pub infer_rows: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_CSV_BATCH_SIZE,
            infer_rows: None,
        }
    }
}

/// A source file resolved on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name as written in the configuration
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
    /// File size in bytes at resolution time
    pub size: u64,
}

/// Resolve a configured source name under a schema directory
///
/// The file must exist and carry a supported extension.
pub fn resolve_source(schema_dir: &Path, name: &str) -> LoadResult<SourceFile> {
    let path = schema_dir.join(name);
    let metadata = match std::fs::metadata(&path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(LoadError::MissingSourceFile(path)),
    };
    let format = SourceFormat::from_path(&path)?;

    Ok(SourceFile {
        name: name.to_string(),
        path,
        format,
        size: metadata.len(),
    })
}

impl SourceFile {
    /// Open the file as a stream of record batches
    ///
    /// With `columns`, the output columns are named positionally from the list.
    pub fn open(&self, columns: Option<&[String]>, options: &ReadOptions) -> LoadResult<SourceBatches> {
        let (reader, rename) = match self.format {
            SourceFormat::DelimitedText => {
                let reader = csv::open(&self.path, columns, options)?;
                (BatchReader::DelimitedText(reader), None)
            }
            SourceFormat::ColumnarBatch => {
                let reader = parquet::open(&self.path)?;
                (
                    BatchReader::ColumnarBatch(reader),
                    columns.map(|c| c.to_vec()),
                )
            }
        };

        Ok(SourceBatches {
            path: self.path.clone(),
            reader,
            rename,
            batches_read: 0,
        })
    }
}

enum BatchReader {
    DelimitedText(arrow::csv::Reader<std::fs::File>),
    ColumnarBatch(::parquet::arrow::arrow_reader::ParquetRecordBatchReader),
}

/// Ordered stream of record batches from one source file
pub struct SourceBatches {
    path: PathBuf,
    reader: BatchReader,
    rename: Option<Vec<String>>,
    batches_read: usize,
}

impl Iterator for SourceBatches {
    type Item = LoadResult<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match &mut self.reader {
            BatchReader::DelimitedText(reader) => reader.next(),
            BatchReader::ColumnarBatch(reader) => reader.next(),
        }?;

        let index = self.batches_read;
        self.batches_read += 1;

        let result = next
            .map_err(|e| LoadError::read(&self.path, e))
            .and_then(|batch| match &self.rename {
                Some(names) => rename_columns(batch, names, &self.path, index),
                None => Ok(batch),
            });
        Some(result)
    }
}

/// Rebuild a schema with positional column names
pub(crate) fn renamed_schema(schema: &Schema, names: &[String]) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .zip(names)
        .map(|(field, name)| field.as_ref().clone().with_name(name))
        .collect();
    Schema::new_with_metadata(fields, schema.metadata().clone())
}

/// Rename a batch's columns positionally
///
/// Fails when the number of names differs from the batch's column count.
pub fn rename_columns(
    batch: RecordBatch,
    names: &[String],
    path: &Path,
    index: usize,
) -> LoadResult<RecordBatch> {
    if batch.num_columns() != names.len() {
        return Err(LoadError::ColumnCountMismatch {
            path: path.to_path_buf(),
            batch: index,
            expected: names.len(),
            found: batch.num_columns(),
        });
    }

    let schema = Arc::new(renamed_schema(&batch.schema(), names));
    RecordBatch::try_new(schema, batch.columns().to_vec()).map_err(|e| LoadError::read(path, e))
}
