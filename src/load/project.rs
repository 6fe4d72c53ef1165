//! Project load: ensure the schema, then reload every table in order

use std::time::Instant;

use tracing::{error, info, info_span};

use super::observer::{LoadObserver, NoopObserver};
use super::options::LoadOptions;
use super::report::ProjectReport;
use super::table::{TableLoadRequest, load_table, validate_table};
use crate::config::{ProjectLayout, ProjectSpec};
use crate::error::LoadResult;
use crate::warehouse::{ConnectionSettings, Warehouse, connect};

/// Runs the tables of a project against a warehouse
pub struct ProjectLoader<'a> {
    layout: &'a ProjectLayout,
    options: LoadOptions,
    observer: &'a dyn LoadObserver,
}

impl<'a> ProjectLoader<'a> {
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self {
            layout,
            options: LoadOptions::default(),
            observer: &NoopObserver,
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn LoadObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Load every table of `project`
    ///
    /// The first failure aborts the run. Tables loaded before it keep their
    /// new contents.
    pub fn run(
        &self,
        warehouse: &mut dyn Warehouse,
        name: &str,
        project: &ProjectSpec,
    ) -> LoadResult<ProjectReport> {
        let mut report = ProjectReport::new(name, &project.schema, false);
        let _span = info_span!(
            "load_project",
            run_id = %report.run_id,
            project = name,
            schema = %project.schema
        )
        .entered();

        let start = Instant::now();
        info!(
            tables = project.tables.len(),
            dialect = %warehouse.dialect(),
            "Starting project load"
        );

        warehouse.ensure_schema(&project.schema)?;

        for (table, spec) in &project.tables {
            let result = TableLoadRequest::from_spec(&project.schema, table, spec).and_then(
                |request| {
                    load_table(
                        &mut *warehouse,
                        self.layout,
                        &request,
                        &self.options,
                        self.observer,
                    )
                },
            );

            match result {
                Ok(table_report) => report.tables.push(table_report),
                Err(e) => {
                    error!(table = %table, error = %e, "Table load failed");
                    return Err(e);
                }
            }
        }

        report.finish(start.elapsed());
        info!(
            tables = report.tables.len(),
            rows = report.rows(),
            duration = %report.duration_string(),
            "Project load complete"
        );

        Ok(report)
    }

    /// Check every table of `project` without touching a warehouse
    pub fn validate(&self, name: &str, project: &ProjectSpec) -> LoadResult<ProjectReport> {
        let mut report = ProjectReport::new(name, &project.schema, true);
        let _span = info_span!(
            "validate_project",
            run_id = %report.run_id,
            project = name
        )
        .entered();

        let start = Instant::now();
        for (table, spec) in &project.tables {
            let request = TableLoadRequest::from_spec(&project.schema, table, spec)?;
            report
                .tables
                .push(validate_table(self.layout, &request, &self.options)?);
        }

        report.finish(start.elapsed());
        info!(
            tables = report.tables.len(),
            sources = report.source_count(),
            "Dry run complete"
        );

        Ok(report)
    }
}

/// Connect with `settings` and load `project`
///
/// With `options.dry_run`, nothing is connected to and only validation runs.
pub fn load_project(
    settings: &ConnectionSettings,
    layout: &ProjectLayout,
    name: &str,
    project: &ProjectSpec,
    options: &LoadOptions,
    observer: &dyn LoadObserver,
) -> LoadResult<ProjectReport> {
    let loader = ProjectLoader::new(layout)
        .with_options(options.clone())
        .with_observer(observer);

    if options.dry_run {
        return loader.validate(name, project);
    }

    let mut warehouse = connect(settings)?;
    loader.run(warehouse.as_mut(), name, project)
}
