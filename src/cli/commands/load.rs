//! Load command implementation

use std::path::PathBuf;

use clap::Args;

use crate::cli::error::CliError;
use crate::cli::output::{format_dry_run, format_summary};
use crate::cli::progress::LoadProgress;
use crate::config::{ProjectLayout, ProjectsConfig};
use crate::error::LoadResult;
use crate::load::{
    LoadObserver, LoadOptions, NoopObserver, ProjectLoader, ProjectReport, load_project,
};
use crate::source::DEFAULT_CSV_BATCH_SIZE;
use crate::warehouse::ConnectionSettings;

/// Arguments for the load command
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Project to load, which must be defined in the configuration
    #[arg(long)]
    pub project: String,

    /// Directory holding config.yml and the datasets directory
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Configuration file (default: <project-root>/config.yml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Datasets directory (default: <project-root>/datasets)
    #[arg(long)]
    pub datasets_dir: Option<PathBuf>,

    /// Records per CSV batch
    #[arg(long, default_value_t = DEFAULT_CSV_BATCH_SIZE)]
    pub batch_size: usize,

    /// Records sampled for CSV type inference (default: whole file)
    #[arg(long)]
    pub infer_rows: Option<usize>,

    /// Validate configuration and source files without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress display
    #[arg(long)]
    pub no_progress: bool,
}

impl LoadArgs {
    /// Filesystem layout implied by the arguments
    pub fn layout(&self) -> ProjectLayout {
        let mut layout = ProjectLayout::from_root(&self.project_root);
        if let Some(config) = &self.config {
            layout = layout.with_config_path(config);
        }
        if let Some(datasets) = &self.datasets_dir {
            layout = layout.with_datasets_root(datasets);
        }
        layout
    }

    /// Load options implied by the arguments
    pub fn options(&self) -> Result<LoadOptions, CliError> {
        if self.batch_size == 0 {
            return Err(CliError::InvalidArgument(
                "--batch-size must be at least 1".to_string(),
            ));
        }
        if self.infer_rows == Some(0) {
            return Err(CliError::InvalidArgument(
                "--infer-rows must be at least 1".to_string(),
            ));
        }

        Ok(LoadOptions::new()
            .with_batch_size(self.batch_size)
            .with_infer_rows(self.infer_rows)
            .with_dry_run(self.dry_run))
    }
}

/// Handle the load command with credentials from the environment
pub fn handle_load(args: &LoadArgs) -> Result<ProjectReport, CliError> {
    run_load(args, ConnectionSettings::from_env)
}

/// Handle the load command with credentials from `credentials`
///
/// Credentials are only requested once the project has been validated, and
/// not at all for a dry run.
pub fn run_load<F>(args: &LoadArgs, credentials: F) -> Result<ProjectReport, CliError>
where
    F: FnOnce() -> LoadResult<ConnectionSettings>,
{
    let options = args.options()?;
    let layout = args.layout();

    let config = ProjectsConfig::load(&layout.config_path)?;
    let project = config.project(&args.project)?;

    if options.dry_run {
        println!("Validating project: {} (dry run)", args.project);
        let report = ProjectLoader::new(&layout)
            .with_options(options)
            .validate(&args.project, project)?;
        print!("{}", format_dry_run(&report));
        return Ok(report);
    }

    let settings = credentials()?;
    println!("✅ Loading data for project: {} - start", args.project);

    let progress = (!args.no_progress).then(|| LoadProgress::new(project.tables.len() as u64));
    let observer: &dyn LoadObserver = match &progress {
        Some(p) => p,
        None => &NoopObserver,
    };

    let result = load_project(&settings, &layout, &args.project, project, &options, observer);

    match (&result, &progress) {
        (Ok(report), Some(p)) => p.finish_success(&format!("{} rows", report.rows())),
        (Err(_), Some(p)) => p.finish_error("Load failed"),
        _ => {}
    }

    let report = result?;
    print!("{}", format_summary(&report));
    println!("✅ Loading data for project: {} - complete", args.project);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: LoadArgs,
    }

    #[test]
    fn test_parse_defaults() {
        let cli = TestCli::parse_from(["load-data", "--project", "sales"]);
        assert_eq!(cli.args.project, "sales");
        assert_eq!(cli.args.batch_size, 100_000);
        assert!(!cli.args.dry_run);

        let layout = cli.args.layout();
        assert_eq!(layout.config_path, PathBuf::from("./config.yml"));
        assert_eq!(layout.datasets_root, PathBuf::from("./datasets"));
    }

    #[test]
    fn test_parse_overrides() {
        let cli = TestCli::parse_from([
            "load-data",
            "--project",
            "sales",
            "--project-root",
            "/srv/loader",
            "--datasets-dir",
            "/mnt/data",
            "--batch-size",
            "500",
            "--dry-run",
        ]);

        let layout = cli.args.layout();
        assert_eq!(layout.config_path, PathBuf::from("/srv/loader/config.yml"));
        assert_eq!(layout.datasets_root, PathBuf::from("/mnt/data"));

        let options = cli.args.options().unwrap();
        assert_eq!(options.csv_batch_size, 500);
        assert!(options.dry_run);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cli = TestCli::parse_from(["load-data", "--project", "p", "--batch-size", "0"]);
        assert!(matches!(
            cli.args.options(),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
