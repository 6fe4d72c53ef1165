//! Destination warehouse abstraction
//!
//! This module provides the database surface the loader needs:
//! - create a schema if it does not exist
//! - truncate a table
//! - append record batches to a table
//!
//! Backends are feature-gated. DuckDB is embedded; PostgreSQL is driven over
//! `tokio-postgres` from a private runtime so the API stays blocking.

use std::fmt;

use arrow::record_batch::RecordBatch;

#[cfg(feature = "duckdb-backend")]
pub mod duckdb;

#[cfg(feature = "postgres-backend")]
pub mod postgres;

pub mod config;
pub mod sql;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDbWarehouse;

#[cfg(feature = "postgres-backend")]
pub use self::postgres::PostgresWarehouse;

pub use config::{ConnectionSettings, Dialect};

use crate::error::{LoadError, LoadResult};

/// Schema-qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Quoted `"schema"."table"` form
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            sql::quote_ident(&self.schema),
            sql::quote_ident(&self.table)
        )
    }

    pub(crate) fn not_found(&self) -> LoadError {
        LoadError::TableNotFound {
            schema: self.schema.clone(),
            table: self.table.clone(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Open connection to a destination warehouse
///
/// Single statements auto-commit. Bulk appends go through a [`WriteSession`].
pub trait Warehouse {
    /// Dialect of this backend
    fn dialect(&self) -> Dialect;

    /// Create the schema if it does not already exist
    fn ensure_schema(&mut self, schema: &str) -> LoadResult<()>;

    /// Remove every row of an existing table
    ///
    /// Fails with [`LoadError::TableNotFound`] when the table is absent.
    fn truncate_table(&mut self, table: &TableRef) -> LoadResult<()>;

    /// Open a write session, released when dropped
    fn session(&mut self) -> LoadResult<Box<dyn WriteSession + '_>>;
}

/// Scoped bulk-write handle
pub trait WriteSession {
    /// Append one batch, committing it, and return the rows written
    ///
    /// Target columns are named after the batch's schema fields.
    fn append(&mut self, table: &TableRef, batch: &RecordBatch) -> LoadResult<usize>;
}

/// Column names of a batch, in order
pub fn batch_columns(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

/// Connect to the warehouse described by `settings`
pub fn connect(settings: &ConnectionSettings) -> LoadResult<Box<dyn Warehouse>> {
    tracing::info!(warehouse = %settings, "Connecting to warehouse");

    match settings.dialect {
        #[cfg(feature = "duckdb-backend")]
        Dialect::DuckDb => {
            let warehouse = if settings.is_in_memory() {
                DuckDbWarehouse::memory()?
            } else {
                DuckDbWarehouse::open(&settings.database)?
            };
            Ok(Box::new(warehouse))
        }
        #[cfg(feature = "postgres-backend")]
        Dialect::Postgres => Ok(Box::new(PostgresWarehouse::connect(settings)?)),
        #[allow(unreachable_patterns)]
        other => Err(LoadError::UnsupportedDialect(format!(
            "{} (backend not enabled in this build)",
            other
        ))),
    }
}
