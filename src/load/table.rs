//! Single-table load: truncate, then append every source in order

use std::time::Instant;

use tracing::{debug, info, info_span};

use super::observer::LoadObserver;
use super::options::LoadOptions;
use super::report::{SourceReport, TableReport};
use crate::config::{ProjectLayout, TableSpec};
use crate::error::{LoadError, LoadResult};
use crate::source::{ReadOptions, SourceFile, resolve_source};
use crate::warehouse::{TableRef, Warehouse};

/// What to load into one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoadRequest {
    pub schema: String,
    pub table: String,
    /// Source file names under `<datasets>/<schema>/`, in load order
    pub sources: Vec<String>,
    /// Column names overriding the files' own header or schema
    pub columns: Option<Vec<String>>,
}

impl TableLoadRequest {
    pub fn new<I, S>(schema: impl Into<String>, table: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into(),
            table: table.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            columns: None,
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build a request from a configured table entry
    pub fn from_spec(schema: &str, table: &str, spec: &TableSpec) -> LoadResult<Self> {
        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
            sources: spec.sources(schema, table)?,
            columns: spec.column_names(),
        })
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.table)
    }
}

/// Resolve every source of a request to a file on disk
///
/// Runs before anything is written, so a bad reference leaves the table untouched.
pub fn resolve_sources(
    layout: &ProjectLayout,
    request: &TableLoadRequest,
) -> LoadResult<Vec<SourceFile>> {
    if request.sources.is_empty() {
        return Err(LoadError::MissingSources {
            schema: request.schema.clone(),
            table: request.table.clone(),
        });
    }

    let schema_dir = layout.schema_dir(&request.schema);
    request
        .sources
        .iter()
        .map(|name| resolve_source(&schema_dir, name))
        .collect()
}

/// Truncate a table and reload it from its sources
pub fn load_table(
    warehouse: &mut dyn Warehouse,
    layout: &ProjectLayout,
    request: &TableLoadRequest,
    options: &LoadOptions,
    observer: &dyn LoadObserver,
) -> LoadResult<TableReport> {
    let table = request.table_ref();
    let _span = info_span!("load_table", table = %table).entered();
    let start = Instant::now();

    let sources = resolve_sources(layout, request)?;
    observer.table_started(&table, &sources);

    warehouse.truncate_table(&table)?;
    debug!(table = %table, "Truncated table");

    let read_options = options.read_options();
    let mut report = TableReport::new(&request.schema, &request.table);

    for source in &sources {
        let source_report = load_source(
            warehouse,
            &table,
            source,
            request.columns.as_deref(),
            &read_options,
            observer,
        )?;
        report.sources.push(source_report);
    }

    report.duration = start.elapsed();
    info!(
        table = %table,
        sources = report.sources.len(),
        batches = report.batches(),
        rows = report.rows(),
        duration_ms = report.duration.as_millis() as u64,
        "Table loaded"
    );
    observer.table_finished(&report);

    Ok(report)
}

/// Validate a table without writing anything
///
/// Sources are resolved and opened; CSV headers and column counts are checked.
pub fn validate_table(
    layout: &ProjectLayout,
    request: &TableLoadRequest,
    options: &LoadOptions,
) -> LoadResult<TableReport> {
    let read_options = options.read_options();
    let mut report = TableReport::new(&request.schema, &request.table);

    for source in resolve_sources(layout, request)? {
        source.open(request.columns.as_deref(), &read_options)?;
        debug!(path = %source.path.display(), format = %source.format, "Source validated");

        report.sources.push(SourceReport {
            name: source.name,
            path: source.path,
            format: source.format,
            batches: 0,
            rows: 0,
            duration: Default::default(),
        });
    }

    Ok(report)
}

fn load_source(
    warehouse: &mut dyn Warehouse,
    table: &TableRef,
    source: &SourceFile,
    columns: Option<&[String]>,
    read_options: &ReadOptions,
    observer: &dyn LoadObserver,
) -> LoadResult<SourceReport> {
    info!(
        path = %source.path.display(),
        format = %source.format,
        "Loading '{}' into {}",
        source.path.display(),
        table
    );
    observer.source_started(table, source);

    let start = Instant::now();
    let batches = source.open(columns, read_options)?;
    let mut session = warehouse.session()?;

    let mut report = SourceReport {
        name: source.name.clone(),
        path: source.path.clone(),
        format: source.format,
        batches: 0,
        rows: 0,
        duration: Default::default(),
    };

    for (index, batch) in batches.enumerate() {
        let batch = batch?;
        let rows = session.append(table, &batch)?;
        debug!(batch = index, rows, "Appended batch");

        report.batches += 1;
        report.rows += rows;
        observer.batch_loaded(table, index, rows);
    }

    report.duration = start.elapsed();
    Ok(report)
}
