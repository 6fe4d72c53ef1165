//! PostgreSQL warehouse backend
//!
//! The async `tokio-postgres` client is driven from a private current-thread
//! runtime. Every call is `block_on`-ed, so statements never overlap.

use std::fmt::Write as _;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use futures_util::SinkExt;
use tokio::runtime::Runtime;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};

use super::config::{ConnectionSettings, Dialect};
use super::sql::{copy_sql, create_schema_sql, truncate_sql};
use super::{TableRef, Warehouse, WriteSession, batch_columns};
use crate::error::{LoadError, LoadResult};

/// Null marker shared by the CSV encoder and the COPY statement
const COPY_NULL: &str = "\\N";

/// PostgreSQL destination
pub struct PostgresWarehouse {
    runtime: Runtime,
    client: Client,
}

impl PostgresWarehouse {
    /// Connect using the given settings
    pub fn connect(settings: &ConnectionSettings) -> LoadResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LoadError::Connection(e.to_string()))?;

        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(
                &settings.postgres_connection_string(),
                NoTls,
            ))
            .map_err(|e| LoadError::Connection(e.to_string()))?;

        // Driven whenever the runtime blocks on a client call
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { runtime, client })
    }
}

fn map_table_error(err: tokio_postgres::Error, table: &TableRef) -> LoadError {
    if err.code() == Some(&SqlState::UNDEFINED_TABLE) {
        table.not_found()
    } else {
        LoadError::from(err)
    }
}

impl Warehouse for PostgresWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn ensure_schema(&mut self, schema: &str) -> LoadResult<()> {
        self.runtime
            .block_on(self.client.batch_execute(&create_schema_sql(schema)))
            .map_err(|e| LoadError::SchemaCreation {
                schema: schema.to_string(),
                message: e.to_string(),
            })
    }

    fn truncate_table(&mut self, table: &TableRef) -> LoadResult<()> {
        self.runtime
            .block_on(self.client.batch_execute(&truncate_sql(table)))
            .map_err(|e| map_table_error(e, table))
    }

    fn session(&mut self) -> LoadResult<Box<dyn WriteSession + '_>> {
        Ok(Box::new(PostgresSession { warehouse: self }))
    }
}

/// Write session streaming batches through `COPY ... FROM STDIN`
pub struct PostgresSession<'a> {
    warehouse: &'a PostgresWarehouse,
}

impl WriteSession for PostgresSession<'_> {
    fn append(&mut self, table: &TableRef, batch: &RecordBatch) -> LoadResult<usize> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let statement = copy_sql(table, &batch_columns(batch));
        let payload = Bytes::from(encode_csv(batch)?);
        let client = &self.warehouse.client;

        let copied = self
            .warehouse
            .runtime
            .block_on(async {
                let sink = client.copy_in::<_, Bytes>(statement.as_str()).await?;
                futures_util::pin_mut!(sink);
                sink.send(payload).await?;
                sink.as_mut().finish().await
            })
            .map_err(|e| map_table_error(e, table))?;

        Ok(copied as usize)
    }
}

/// Encode a batch as headerless CSV for COPY
///
/// Every non-null cell is quoted, so only an unquoted `\N` reads back as NULL.
fn encode_csv(batch: &RecordBatch) -> LoadResult<Vec<u8>> {
    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|array| ArrayFormatter::try_new(array.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoadError::Database(format!("Failed to encode batch for COPY: {e}")))?;

    let mut buf = String::new();
    let mut cell = String::new();
    for row in 0..batch.num_rows() {
        for (index, (array, formatter)) in batch.columns().iter().zip(&formatters).enumerate() {
            if index > 0 {
                buf.push(',');
            }
            if array.is_null(row) {
                buf.push_str(COPY_NULL);
                continue;
            }

            cell.clear();
            write!(cell, "{}", formatter.value(row))
                .map_err(|e| LoadError::Database(format!("Failed to encode batch for COPY: {e}")))?;
            buf.push('"');
            buf.push_str(&cell.replace('"', "\"\""));
            buf.push('"');
        }
        buf.push('\n');
    }

    Ok(buf.into_bytes())
}
