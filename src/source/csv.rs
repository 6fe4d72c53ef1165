//! Delimited text reader

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::{Reader, ReaderBuilder};

use super::{ReadOptions, renamed_schema};
use crate::error::{LoadError, LoadResult};

/// Open a CSV file as a batch reader
///
/// Column types are inferred from the data. Without `columns`, names come
/// from the header row; with `columns`, the file is read as headerless and the
/// given names are assigned.
pub(super) fn open(
    path: &Path,
    columns: Option<&[String]>,
    options: &ReadOptions,
) -> LoadResult<Reader<File>> {
    let mut file = File::open(path).map_err(|e| LoadError::read(path, e))?;
    let format = Format::default().with_header(columns.is_none());

    let (inferred, records) = format
        .infer_schema(&mut file, options.infer_rows)
        .map_err(|e| LoadError::read(path, e))?;
    file.seek(SeekFrom::Start(0))?;

    tracing::debug!(
        path = %path.display(),
        columns = inferred.fields().len(),
        sampled = records,
        "Inferred CSV schema"
    );

    let schema = match columns {
        Some(names) => {
            if names.len() != inferred.fields().len() {
                return Err(LoadError::ColumnCountMismatch {
                    path: path.to_path_buf(),
                    batch: 0,
                    expected: names.len(),
                    found: inferred.fields().len(),
                });
            }
            renamed_schema(&inferred, names)
        }
        None => inferred,
    };

    ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .with_batch_size(options.batch_size.max(1))
        .build(file)
        .map_err(|e| LoadError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::AsArray;
    use arrow::record_batch::RecordBatch;
    use arrow::datatypes::{DataType, Int64Type};
    use tempfile::tempdir;

    fn read_all(reader: Reader<File>) -> Vec<RecordBatch> {
        reader.map(|b| b.unwrap()).collect()
    }

    #[test]
    fn test_header_and_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "id,amount,paid,note\n1,9.5,true,a\n2,3.25,false,b\n").unwrap();

        let batches = read_all(open(&path, None, &ReadOptions::default()).unwrap());
        assert_eq!(batches.len(), 1);

        let schema = batches[0].schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["id", "amount", "paid", "note"]);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Boolean);
        assert_eq!(schema.field(3).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_headerless_with_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        std::fs::write(&path, "1,2\n3,4\n").unwrap();

        let names = vec!["x".to_string(), "y".to_string()];
        let batches = read_all(open(&path, Some(names.as_slice()), &ReadOptions::default()).unwrap());

        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "x");
        assert_eq!(batch.schema().field(1).name(), "y");
        let x = batch.column(0).as_primitive::<Int64Type>();
        assert_eq!(x.values().to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_column_count_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triples.csv");
        std::fs::write(&path, "1,2,3\n").unwrap();

        let names = vec!["x".to_string(), "y".to_string()];
        let err = open(&path, Some(names.as_slice()), &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ColumnCountMismatch { expected: 2, found: 3, .. }
        ));
    }

    #[test]
    fn test_batch_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        let mut content = String::from("id\n");
        for i in 0..10 {
            content.push_str(&format!("{i}\n"));
        }
        std::fs::write(&path, content).unwrap();

        let options = ReadOptions {
            batch_size: 3,
            infer_rows: None,
        };
        let batches = read_all(open(&path, None, &options).unwrap());
        let sizes: Vec<usize> = batches.iter().map(|b| b.num_rows()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }
}
