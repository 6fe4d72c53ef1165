//! DuckDB warehouse backend

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
    TimeUnit as ArrowTimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use duckdb::types::{TimeUnit, Value};

use super::config::Dialect;
use super::sql::{create_schema_sql, insert_sql, truncate_sql};
use super::{TableRef, Warehouse, WriteSession, batch_columns};
use crate::error::{LoadError, LoadResult};

/// Embedded DuckDB destination
pub struct DuckDbWarehouse {
    conn: duckdb::Connection,
    path: Option<String>,
}

impl DuckDbWarehouse {
    /// Open or create a database file
    pub fn open(path: &str) -> LoadResult<Self> {
        let conn =
            duckdb::Connection::open(path).map_err(|e| LoadError::Connection(e.to_string()))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database
    pub fn memory() -> LoadResult<Self> {
        let conn =
            duckdb::Connection::open_in_memory().map_err(|e| LoadError::Connection(e.to_string()))?;
        Ok(Self { conn, path: None })
    }

    /// Database file path (None when in memory)
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Underlying connection, for DDL and inspection
    pub fn connection(&self) -> &duckdb::Connection {
        &self.conn
    }
}

fn is_missing_table(err: &duckdb::Error) -> bool {
    let message = err.to_string();
    message.contains("Catalog Error") && message.contains("does not exist")
}

fn map_table_error(err: duckdb::Error, table: &TableRef) -> LoadError {
    if is_missing_table(&err) {
        table.not_found()
    } else {
        LoadError::from(err)
    }
}

impl Warehouse for DuckDbWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn ensure_schema(&mut self, schema: &str) -> LoadResult<()> {
        self.conn
            .execute_batch(&create_schema_sql(schema))
            .map_err(|e| LoadError::SchemaCreation {
                schema: schema.to_string(),
                message: e.to_string(),
            })
    }

    fn truncate_table(&mut self, table: &TableRef) -> LoadResult<()> {
        self.conn
            .execute_batch(&truncate_sql(table))
            .map_err(|e| map_table_error(e, table))
    }

    fn session(&mut self) -> LoadResult<Box<dyn WriteSession + '_>> {
        Ok(Box::new(DuckDbSession {
            conn: &mut self.conn,
        }))
    }
}

/// Write session borrowing the warehouse connection
pub struct DuckDbSession<'a> {
    conn: &'a mut duckdb::Connection,
}

impl WriteSession for DuckDbSession<'_> {
    fn append(&mut self, table: &TableRef, batch: &RecordBatch) -> LoadResult<usize> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let sql = insert_sql(table, &batch_columns(batch));
        let options = FormatOptions::default();
        let readers = batch
            .columns()
            .iter()
            .zip(batch.schema_ref().fields())
            .map(|(array, field)| CellReader::new(field.name(), array, &options))
            .collect::<LoadResult<Vec<_>>>()?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql).map_err(|e| map_table_error(e, table))?;
            for row in 0..batch.num_rows() {
                let values = readers
                    .iter()
                    .map(|r| r.value(row))
                    .collect::<LoadResult<Vec<Value>>>()?;
                stmt.execute(duckdb::params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(batch.num_rows())
    }
}

/// Converts Arrow cells to DuckDB values
///
/// Types DuckDB binds natively map directly; anything else is rendered as
/// text and cast by DuckDB on insert.
struct CellReader<'a> {
    column: &'a str,
    array: &'a ArrayRef,
    formatter: Option<ArrayFormatter<'a>>,
}

impl<'a> CellReader<'a> {
    fn new(
        column: &'a str,
        array: &'a ArrayRef,
        options: &'a FormatOptions<'a>,
    ) -> LoadResult<Self> {
        let native = matches!(
            array.data_type(),
            DataType::Null
                | DataType::Boolean
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
                | DataType::Utf8
                | DataType::LargeUtf8
                | DataType::Timestamp(_, _)
        );

        let formatter = if native {
            None
        } else {
            Some(
                ArrayFormatter::try_new(array.as_ref(), options)
                    .map_err(|e| LoadError::Database(e.to_string()))?,
            )
        };

        Ok(Self {
            column,
            array,
            formatter,
        })
    }

    fn value(&self, row: usize) -> LoadResult<Value> {
        let array = self.array;
        if array.is_null(row) {
            return Ok(Value::Null);
        }
        if let Some(formatter) = &self.formatter {
            return Ok(Value::Text(formatter.value(row).to_string()));
        }

        let value = match array.data_type() {
            DataType::Boolean => Value::Boolean(array.as_boolean().value(row)),
            DataType::Int8 => Value::TinyInt(array.as_primitive::<Int8Type>().value(row)),
            DataType::Int16 => Value::SmallInt(array.as_primitive::<Int16Type>().value(row)),
            DataType::Int32 => Value::Int(array.as_primitive::<Int32Type>().value(row)),
            DataType::Int64 => Value::BigInt(array.as_primitive::<Int64Type>().value(row)),
            DataType::UInt8 => Value::UTinyInt(array.as_primitive::<UInt8Type>().value(row)),
            DataType::UInt16 => Value::USmallInt(array.as_primitive::<UInt16Type>().value(row)),
            DataType::UInt32 => Value::UInt(array.as_primitive::<UInt32Type>().value(row)),
            DataType::UInt64 => Value::UBigInt(array.as_primitive::<UInt64Type>().value(row)),
            DataType::Float32 => Value::Float(array.as_primitive::<Float32Type>().value(row)),
            DataType::Float64 => Value::Double(array.as_primitive::<Float64Type>().value(row)),
            DataType::Utf8 => Value::Text(array.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Value::Text(array.as_string::<i64>().value(row).to_string()),
            DataType::Timestamp(unit, _) => {
                Value::Timestamp(TimeUnit::Microsecond, self.timestamp_micros(*unit, row)?)
            }
            _ => Value::Null,
        };
        Ok(value)
    }

    fn timestamp_micros(&self, unit: ArrowTimeUnit, row: usize) -> LoadResult<i64> {
        let array = self.array;
        let micros = match unit {
            ArrowTimeUnit::Second => array
                .as_primitive::<TimestampSecondType>()
                .value(row)
                .checked_mul(1_000_000),
            ArrowTimeUnit::Millisecond => array
                .as_primitive::<TimestampMillisecondType>()
                .value(row)
                .checked_mul(1_000),
            ArrowTimeUnit::Microsecond => {
                Some(array.as_primitive::<TimestampMicrosecondType>().value(row))
            }
            ArrowTimeUnit::Nanosecond => {
                Some(array.as_primitive::<TimestampNanosecondType>().value(row) / 1_000)
            }
        };

        micros.ok_or_else(|| {
            LoadError::Database(format!(
                "Timestamp out of range in column '{}' (row {row})",
                self.column
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{
        BooleanArray, Date32Array, Float64Array, Int64Array, StringArray, TimestampSecondArray,
    };
    use arrow::datatypes::{Field, Schema};

    fn warehouse_with_table() -> DuckDbWarehouse {
        let mut wh = DuckDbWarehouse::memory().unwrap();
        wh.ensure_schema("sales").unwrap();
        wh.connection()
            .execute_batch(
                "CREATE TABLE sales.orders (id BIGINT, amount DOUBLE, paid BOOLEAN, note VARCHAR, day DATE)",
            )
            .unwrap();
        wh
    }

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("amount", DataType::Float64, true),
            Field::new("paid", DataType::Boolean, true),
            Field::new("note", DataType::Utf8, true),
            Field::new("day", DataType::Date32, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![Some(9.5), None])),
                Arc::new(BooleanArray::from(vec![Some(true), Some(false)])),
                Arc::new(StringArray::from(vec![Some("first"), None])),
                Arc::new(Date32Array::from(vec![Some(19723), None])),
            ],
        )
        .unwrap()
    }

    fn count(wh: &DuckDbWarehouse) -> i64 {
        wh.connection()
            .query_row("SELECT COUNT(*) FROM sales.orders", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut wh = DuckDbWarehouse::memory().unwrap();
        wh.ensure_schema("sales").unwrap();
        wh.ensure_schema("sales").unwrap();
        assert_eq!(wh.dialect(), Dialect::DuckDb);
        assert!(wh.path().is_none());
    }

    #[test]
    fn test_append_and_truncate() {
        let mut wh = warehouse_with_table();
        let table = TableRef::new("sales", "orders");

        {
            let mut session = wh.session().unwrap();
            assert_eq!(session.append(&table, &sample_batch()).unwrap(), 2);
        }
        assert_eq!(count(&wh), 2);

        let (note, day): (Option<String>, String) = wh
            .connection()
            .query_row(
                "SELECT note, CAST(day AS VARCHAR) FROM sales.orders WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(note.as_deref(), Some("first"));
        assert_eq!(day, "2024-01-01");

        wh.truncate_table(&table).unwrap();
        assert_eq!(count(&wh), 0);
    }

    #[test]
    fn test_truncate_missing_table() {
        let mut wh = DuckDbWarehouse::memory().unwrap();
        wh.ensure_schema("sales").unwrap();

        let err = wh
            .truncate_table(&TableRef::new("sales", "ghost"))
            .unwrap_err();
        assert!(matches!(err, LoadError::TableNotFound { ref table, .. } if table == "ghost"));
    }

    fn events_batch(seconds: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("at", DataType::Timestamp(ArrowTimeUnit::Second, None), false),
        ]));
        let ids: Vec<i64> = (1..=seconds.len() as i64).collect();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(TimestampSecondArray::from(seconds)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_append_second_timestamps() {
        let mut wh = DuckDbWarehouse::memory().unwrap();
        wh.ensure_schema("sales").unwrap();
        wh.connection()
            .execute_batch("CREATE TABLE sales.events (id BIGINT, \"at\" TIMESTAMP)")
            .unwrap();
        let table = TableRef::new("sales", "events");

        {
            let mut session = wh.session().unwrap();
            session.append(&table, &events_batch(vec![1_704_067_200])).unwrap();
        }

        let at: String = wh
            .connection()
            .query_row("SELECT CAST(\"at\" AS VARCHAR) FROM sales.events", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(at, "2024-01-01 00:00:00");
    }

    #[test]
    fn test_append_rejects_out_of_range_timestamp() {
        let mut wh = DuckDbWarehouse::memory().unwrap();
        wh.ensure_schema("sales").unwrap();
        wh.connection()
            .execute_batch("CREATE TABLE sales.events (id BIGINT, \"at\" TIMESTAMP)")
            .unwrap();
        let table = TableRef::new("sales", "events");

        let err = {
            let mut session = wh.session().unwrap();
            session
                .append(&table, &events_batch(vec![0, i64::MAX / 1_000]))
                .unwrap_err()
        };
        assert!(matches!(err, LoadError::Database(ref msg) if msg.contains("'at'")));

        let rows: i64 = wh
            .connection()
            .query_row("SELECT COUNT(*) FROM sales.events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}
