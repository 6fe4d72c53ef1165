//! Project configuration document
//!
//! The configuration is a YAML document with a top-level `projects` mapping:
//!
//! ```yaml
//! projects:
//!   sales:
//!     schema: sales
//!     tables:
//!       orders:
//!         sources: [orders_2023.csv, orders_2024.parquet]
//!       regions:
//!         source: regions.csv
//!         columns:
//!           - name: region_id
//!           - name: region_name
//! ```
//!
//! Table order is the declaration order in the document.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

/// Default configuration filename, relative to the project root
pub const CONFIG_FILENAME: &str = "config.yml";

/// Default datasets directory, relative to the project root
pub const DATASETS_DIRNAME: &str = "datasets";

/// Parsed configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Projects keyed by name, in declaration order
    pub projects: IndexMap<String, ProjectSpec>,
}

/// One project: a destination schema and its tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Destination schema for every table in the project
    pub schema: String,
    /// Tables keyed by name, in declaration order
    #[serde(default)]
    pub tables: IndexMap<String, TableSpec>,
}

/// Either a single file reference or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceList {
    One(String),
    Many(Vec<String>),
}

impl SourceList {
    /// Normalise to an ordered list, dropping blank entries
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SourceList::One(name) => vec![name.clone()],
            SourceList::Many(names) => names.clone(),
        }
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect()
    }
}

/// Column entry in a table's `columns` list
///
/// Only `name` is used; other keys (type, description, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
}

/// Table entry: where its rows come from and what its columns are called
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnSpec>>,
}

impl TableSpec {
    /// Ordered source file names for this table
    ///
    /// `sources` wins over `source`; an empty value counts as absent.
    pub fn sources(&self, schema: &str, table: &str) -> LoadResult<Vec<String>> {
        let from = |list: &Option<SourceList>| {
            list.as_ref()
                .map(SourceList::to_vec)
                .filter(|names| !names.is_empty())
        };

        from(&self.sources)
            .or_else(|| from(&self.source))
            .ok_or_else(|| LoadError::MissingSources {
                schema: schema.to_string(),
                table: table.to_string(),
            })
    }

    /// Explicit column names, if configured
    ///
    /// An empty `columns` list counts as absent.
    pub fn column_names(&self) -> Option<Vec<String>> {
        self.columns
            .as_ref()
            .filter(|cols| !cols.is_empty())
            .map(|cols| cols.iter().map(|c| c.name.clone()).collect())
    }
}

impl ProjectsConfig {
    /// Load the configuration document from disk
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::ConfigNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::parse(&content).map_err(|reason| LoadError::ConfigNotFound {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse configuration from a YAML string
    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Names of all configured projects, in declaration order
    pub fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    /// Look up a project by name
    pub fn project(&self, name: &str) -> LoadResult<&ProjectSpec> {
        self.projects
            .get(name)
            .ok_or_else(|| LoadError::UnknownProject {
                name: name.to_string(),
                available: self.project_names(),
            })
    }
}

/// Filesystem layout of a loader project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Path of the configuration document
    pub config_path: PathBuf,
    /// Root directory containing one sub-directory per schema
    pub datasets_root: PathBuf,
}

impl ProjectLayout {
    /// Standard layout under a project root
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_path: root.join(CONFIG_FILENAME),
            datasets_root: root.join(DATASETS_DIRNAME),
        }
    }

    /// Override the configuration path
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Override the datasets root
    pub fn with_datasets_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.datasets_root = path.into();
        self
    }

    /// Directory holding the source files of a schema
    pub fn schema_dir(&self, schema: &str) -> PathBuf {
        self.datasets_root.join(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
projects:
  sales:
    schema: sales
    tables:
      orders:
        sources:
          - orders_2023.csv
          - orders_2024.parquet
      regions:
        source: regions.csv
        columns:
          - name: region_id
            type: integer
          - name: region_name
      broken: {}
  hr:
    schema: people
    tables:
      staff:
        source: [staff.pq]
"#;

    #[test]
    fn test_parse_preserves_declaration_order() {
        let config = ProjectsConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.project_names(), vec!["sales", "hr"]);

        let sales = config.project("sales").unwrap();
        let tables: Vec<&str> = sales.tables.keys().map(|k| k.as_str()).collect();
        assert_eq!(tables, vec!["orders", "regions", "broken"]);
    }

    #[test]
    fn test_sources_normalisation() {
        let config = ProjectsConfig::parse(SAMPLE).unwrap();
        let sales = config.project("sales").unwrap();

        assert_eq!(
            sales.tables["orders"].sources("sales", "orders").unwrap(),
            vec!["orders_2023.csv", "orders_2024.parquet"]
        );
        assert_eq!(
            sales.tables["regions"].sources("sales", "regions").unwrap(),
            vec!["regions.csv"]
        );

        let hr = config.project("hr").unwrap();
        assert_eq!(
            hr.tables["staff"].sources("people", "staff").unwrap(),
            vec!["staff.pq"]
        );
    }

    #[test]
    fn test_missing_sources() {
        let config = ProjectsConfig::parse(SAMPLE).unwrap();
        let sales = config.project("sales").unwrap();

        let err = sales.tables["broken"].sources("sales", "broken").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingSources { ref schema, ref table } if schema == "sales" && table == "broken"
        ));
    }

    #[test]
    fn test_empty_sources_falls_back_to_source() {
        let spec = TableSpec {
            source: Some(SourceList::One("a.csv".to_string())),
            sources: Some(SourceList::Many(Vec::new())),
            columns: None,
        };
        assert_eq!(spec.sources("s", "t").unwrap(), vec!["a.csv"]);

        let blank = TableSpec {
            source: Some(SourceList::One("  ".to_string())),
            ..Default::default()
        };
        assert!(blank.sources("s", "t").is_err());
    }

    #[test]
    fn test_column_names() {
        let config = ProjectsConfig::parse(SAMPLE).unwrap();
        let sales = config.project("sales").unwrap();

        assert_eq!(
            sales.tables["regions"].column_names(),
            Some(vec!["region_id".to_string(), "region_name".to_string()])
        );
        assert_eq!(sales.tables["orders"].column_names(), None);
    }

    #[test]
    fn test_empty_columns_is_absent() {
        let config = ProjectsConfig::parse(
            "projects:\n  sales:\n    schema: sales\n    tables:\n      orders:\n        source: orders.csv\n        columns: []\n",
        )
        .unwrap();
        let orders = &config.project("sales").unwrap().tables["orders"];

        assert_eq!(orders.columns.as_ref().map(|cols| cols.len()), Some(0));
        assert_eq!(orders.column_names(), None);
    }

    #[test]
    fn test_unknown_project() {
        let config = ProjectsConfig::parse(SAMPLE).unwrap();
        let err = config.project("doesnotexist").unwrap_err();
        match err {
            LoadError::UnknownProject { name, available } => {
                assert_eq!(name, "doesnotexist");
                assert_eq!(available, vec!["sales", "hr"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ProjectsConfig::load(&dir.path().join("config.yml")).unwrap_err();
        assert!(matches!(err, LoadError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "tables: [unclosed").unwrap();

        let err = ProjectsConfig::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_requires_projects_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "schema: sales\n").unwrap();

        assert!(ProjectsConfig::load(&path).is_err());
    }

    #[test]
    fn test_layout() {
        let layout = ProjectLayout::from_root("/srv/loader");
        assert_eq!(layout.config_path, PathBuf::from("/srv/loader/config.yml"));
        assert_eq!(
            layout.schema_dir("sales"),
            PathBuf::from("/srv/loader/datasets/sales")
        );

        let layout = layout
            .with_config_path("/etc/loader.yml")
            .with_datasets_root("/mnt/data");
        assert_eq!(layout.config_path, PathBuf::from("/etc/loader.yml"));
        assert_eq!(layout.schema_dir("hr"), PathBuf::from("/mnt/data/hr"));
    }
}
