//! Connection settings
//!
//! Credentials are read from the environment once at startup and handed to
//! [`connect`](super::connect) as an explicit struct.

use std::fmt;
use std::str::FromStr;

use crate::error::{LoadError, LoadResult};

/// Environment variable for the database engine (dialect)
pub const ENV_DB_ENGINE: &str = "DB_ENGINE";

/// Environment variable for the database host
pub const ENV_DB_HOST: &str = "DB_HOST";

/// Environment variable for the database port
pub const ENV_DB_PORT: &str = "DB_PORT";

/// Environment variable for the database user
pub const ENV_DB_USER: &str = "DB_USER";

/// Environment variable for the database password
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";

/// Environment variable for the database name (DuckDB: file path)
pub const ENV_DB_NAME: &str = "DB_NAME";

/// DuckDB database name for an in-memory database
pub const DUCKDB_MEMORY: &str = ":memory:";

/// Warehouse dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// PostgreSQL server
    Postgres,
    /// DuckDB embedded database
    DuckDb,
}

impl FromStr for Dialect {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "postgresql+psycopg2" and friends name a driver, not a dialect
        let dialect = s.split('+').next().unwrap_or_default().trim();
        match dialect.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            _ => Err(LoadError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgresql"),
            Dialect::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Credentials for the destination warehouse
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub dialect: Dialect,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionSettings {
    /// Read settings from the process environment
    pub fn from_env() -> LoadResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    ///
    /// Every variable is required; an empty value counts as unset.
    pub fn from_lookup<F>(lookup: F) -> LoadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> LoadResult<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| LoadError::MissingCredential(key.to_string()))
        };

        let engine = require(ENV_DB_ENGINE)?;
        let host = require(ENV_DB_HOST)?;
        let port = require(ENV_DB_PORT)?;
        let user = require(ENV_DB_USER)?;
        let password = require(ENV_DB_PASSWORD)?;
        let database = require(ENV_DB_NAME)?;

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| LoadError::InvalidCredential {
                name: ENV_DB_PORT.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            dialect: engine.parse()?,
            host,
            port,
            user,
            password,
            database,
        })
    }

    /// libpq-style key/value connection string for tokio-postgres
    pub fn postgres_connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            quote_conninfo(&self.host),
            self.port,
            quote_conninfo(&self.user),
            quote_conninfo(&self.password),
            quote_conninfo(&self.database),
        )
    }

    /// Whether a DuckDB database should be opened in memory
    pub fn is_in_memory(&self) -> bool {
        self.dialect == Dialect::DuckDb && self.database == DUCKDB_MEMORY
    }
}

fn quote_conninfo(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dialect {
            Dialect::DuckDb => write!(f, "duckdb://{}", self.database),
            Dialect::Postgres => write!(
                f,
                "postgresql://{}:****@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .finish()
    }
}
