//! Dataset Loader - config-driven bulk loading into a relational warehouse
//!
//! Provides:
//! - Project configuration (schema, tables, source files, column overrides)
//! - CSV and Parquet readers producing Arrow record batches
//! - Warehouse backends (DuckDB, PostgreSQL) behind a blocking trait
//! - The truncate-then-append load pipeline, per table and per project
//!
//! Every table reload is idempotent: the table is truncated once, then every
//! configured source is appended in order.

pub mod cli;
pub mod config;
pub mod error;
pub mod load;
pub mod source;
pub mod warehouse;

pub use config::{ProjectLayout, ProjectSpec, ProjectsConfig, TableSpec};
pub use error::{LoadError, LoadResult};
pub use load::{
    LoadObserver, LoadOptions, NoopObserver, ProjectLoader, ProjectReport, TableLoadRequest,
    TableReport, load_project, load_table,
};
pub use source::{SourceFile, SourceFormat};
pub use warehouse::{ConnectionSettings, Dialect, TableRef, Warehouse, WriteSession, connect};
