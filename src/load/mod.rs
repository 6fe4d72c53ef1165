//! Load pipeline
//!
//! A project load ensures the destination schema once, then reloads each
//! table in declaration order. A table reload truncates the table and appends
//! every batch of every source file, in the configured order.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_loader::config::{ProjectLayout, ProjectsConfig};
//! use dataset_loader::load::{LoadOptions, NoopObserver, load_project};
//! use dataset_loader::warehouse::ConnectionSettings;
//!
//! let layout = ProjectLayout::from_root(".");
//! let config = ProjectsConfig::load(&layout.config_path)?;
//! let project = config.project("sales")?;
//! let settings = ConnectionSettings::from_env()?;
//!
//! let report = load_project(&settings, &layout, "sales", project, &LoadOptions::default(), &NoopObserver)?;
//! println!("Loaded {} rows", report.rows());
//! ```

mod observer;
mod options;
mod project;
mod report;
mod table;

pub use observer::{LoadObserver, NoopObserver};
pub use options::LoadOptions;
pub use project::{ProjectLoader, load_project};
pub use report::{ProjectReport, SourceReport, TableReport};
pub use table::{TableLoadRequest, load_table, resolve_sources, validate_table};
