//! Load reports

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::source::SourceFormat;

/// Outcome of loading one source file
#[derive(Debug, Clone)]
pub struct SourceReport {
    /// Name as written in the configuration
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
    pub batches: usize,
    pub rows: usize,
    pub duration: Duration,
}

/// Outcome of loading one table
#[derive(Debug, Clone)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    /// Per-source results, in load order
    pub sources: Vec<SourceReport>,
    pub duration: Duration,
}

impl TableReport {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            sources: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Total rows appended
    pub fn rows(&self) -> usize {
        self.sources.iter().map(|s| s.rows).sum()
    }

    /// Total batches appended
    pub fn batches(&self) -> usize {
        self.sources.iter().map(|s| s.batches).sum()
    }
}

/// Outcome of loading a whole project
#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Unique identifier of this run
    pub run_id: Uuid,
    pub project: String,
    pub schema: String,
    /// Per-table results, in declaration order
    pub tables: Vec<TableReport>,
    /// True when nothing was written
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration: Duration,
}

impl ProjectReport {
    pub fn new(project: impl Into<String>, schema: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            project: project.into(),
            schema: schema.into(),
            tables: Vec::new(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            duration: Duration::ZERO,
        }
    }

    /// Total rows appended across all tables
    pub fn rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows()).sum()
    }

    /// Number of source files loaded (or validated, in a dry run)
    pub fn source_count(&self) -> usize {
        self.tables.iter().map(|t| t.sources.len()).sum()
    }

    /// Get rows per second throughput
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.rows() as f64 / secs
        }
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let secs = self.duration.as_secs();
        if secs < 60 {
            format!("{}.{:01}s", secs, self.duration.subsec_millis() / 100)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }

    pub(crate) fn finish(&mut self, duration: Duration) {
        self.duration = duration;
        self.finished_at = Some(Utc::now());
    }
}
