//! CLI binary entry point for load-data

use clap::Parser;
use dataset_loader::cli::CliError;
use dataset_loader::cli::commands::load::{LoadArgs, handle_load};
use dataset_loader::error::LoadError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "load-data")]
#[command(about = "Load data for the specified project into the warehouse")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Whether the run got far enough to write to the warehouse
fn reached_warehouse(err: &CliError) -> bool {
    !matches!(
        err,
        CliError::InvalidArgument(_)
            | CliError::Load(
                LoadError::ConfigNotFound { .. }
                    | LoadError::UnknownProject { .. }
                    | LoadError::MissingCredential(_)
                    | LoadError::InvalidCredential { .. }
                    | LoadError::UnsupportedDialect(_)
                    | LoadError::Connection(_)
            )
    )
}

fn main() {
    // A missing .env file is fine; the variables may come from the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handle_load(&cli.load) {
        eprintln!("Error: {}", e.user_message());
        if reached_warehouse(&e) && !cli.load.dry_run {
            eprintln!(
                "\nTables loaded before the failure keep their new contents; \
                 rerun the project to reload everything."
            );
        }
        std::process::exit(1);
    }
}
