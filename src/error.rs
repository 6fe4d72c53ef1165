//! Error types for load operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving configuration or loading tables
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration document missing, unreadable or malformed
    #[error("Configuration not found at {path}: {reason}")]
    ConfigNotFound { path: PathBuf, reason: String },

    /// Requested project is not declared in the configuration
    #[error("Invalid project '{name}'. Must be one of: {}", .available.join(", "))]
    UnknownProject {
        name: String,
        available: Vec<String>,
    },

    /// Table declares neither `source` nor `sources`
    #[error("No sources defined for {schema}.{table}")]
    MissingSources { schema: String, table: String },

    /// Referenced source file does not exist on disk
    #[error("Missing source file: {0}")]
    MissingSourceFile(PathBuf),

    /// Source file extension is not a supported format
    #[error("Unsupported file type: '{extension}' ({path})")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// Column override does not match the number of columns in a batch
    #[error(
        "Column count mismatch in {path} (batch {batch}): expected {expected} columns, found {found}"
    )]
    ColumnCountMismatch {
        path: PathBuf,
        batch: usize,
        expected: usize,
        found: usize,
    },

    /// Destination schema could not be created
    #[error("Failed to create schema '{schema}': {message}")]
    SchemaCreation { schema: String, message: String },

    /// Destination table does not exist
    #[error("Table not found: {schema}.{table}")]
    TableNotFound { schema: String, table: String },

    /// Required credential not present in the environment
    #[error("Missing required environment variable: {0}")]
    MissingCredential(String),

    /// Credential present but not usable
    #[error("Invalid value for {name}: {reason}")]
    InvalidCredential { name: String, reason: String },

    /// Database engine not recognised or not compiled in
    #[error("Unsupported database engine: {0}")]
    UnsupportedDialect(String),

    /// Failed to connect to the destination
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Database statement failed
    #[error("Database error: {0}")]
    Database(String),

    /// Source file could not be decoded
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Wrap an Arrow/Parquet decode error with the file it came from
    pub fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        LoadError::Read {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            LoadError::ConfigNotFound { path, reason } => {
                format!(
                    "Configuration not found at {}: {reason}\n\n\
                    Hint: Pass --config or --project-root pointing at a directory with config.yml.",
                    path.display()
                )
            }
            LoadError::MissingSources { schema, table } => {
                format!(
                    "No sources defined for {schema}.{table}.\n\n\
                    Hint: Add a 'source' or 'sources' entry for the table in the configuration."
                )
            }
            LoadError::MissingSourceFile(path) => {
                format!(
                    "Missing source file: {}\n\nHint: Source files live under <datasets>/<schema>/.",
                    path.display()
                )
            }
            LoadError::UnsupportedFileType { path, extension } => {
                format!(
                    "Unsupported file type '{extension}' for {}\n\n\
                    Hint: Supported extensions are .csv, .parquet and .pq.",
                    path.display()
                )
            }
            LoadError::ColumnCountMismatch {
                path,
                batch,
                expected,
                found,
            } => {
                format!(
                    "Column count mismatch in {} (batch {batch}): {expected} configured, {found} in file.\n\n\
                    Hint: The 'columns' list must name every column of the source file.",
                    path.display()
                )
            }
            LoadError::TableNotFound { schema, table } => {
                format!(
                    "Table not found: {schema}.{table}\n\n\
                    Hint: Destination tables must be created before loading."
                )
            }
            LoadError::MissingCredential(var) => {
                format!(
                    "Missing required environment variable: {var}\n\n\
                    Hint: Set DB_ENGINE, DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME (a .env file works)."
                )
            }
            LoadError::UnsupportedDialect(engine) => {
                format!(
                    "Unsupported database engine: {engine}\n\n\
                    Hint: Use 'postgresql' or 'duckdb', and build with the matching backend feature."
                )
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(feature = "duckdb-backend")]
impl From<duckdb::Error> for LoadError {
    fn from(err: duckdb::Error) -> Self {
        LoadError::Database(err.to_string())
    }
}

#[cfg(feature = "postgres-backend")]
impl From<tokio_postgres::Error> for LoadError {
    fn from(err: tokio_postgres::Error) -> Self {
        LoadError::Database(err.to_string())
    }
}
