//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Default input/output files of one extraction table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// cogdata configuration with layered hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wiki JSON document
    pub wiki_json: Option<PathBuf>,

    /// Flat wiki CSV
    pub wiki_csv: Option<PathBuf>,

    /// Directory of table overrides
    pub tables_dir: Option<PathBuf>,

    /// Per-table default paths
    pub sources: BTreeMap<String, SourcePaths>,

    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from explicit sources, merging in priority order
    pub fn load_layers(
        global_path: Option<&Path>,
        project: Option<&Project>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/cogdata/config.yaml)
        if let Some(global) = global_path.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Project config (.cogdata/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
            config.base_dir = Some(project.root().to_path_buf());
        }

        // 4. Environment variables
        if let Some(path) = env("COGDATA_WIKI_JSON") {
            config.wiki_json = Some(PathBuf::from(path));
        }
        if let Some(path) = env("COGDATA_WIKI_CSV") {
            config.wiki_csv = Some(PathBuf::from(path));
        }
        if let Some(path) = env("COGDATA_TABLES_DIR") {
            config.tables_dir = Some(PathBuf::from(path));
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str::<Config>(&contents).ok()
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cogdata")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.wiki_json.is_some() {
            self.wiki_json = other.wiki_json;
        }
        if other.wiki_csv.is_some() {
            self.wiki_csv = other.wiki_csv;
        }
        if other.tables_dir.is_some() {
            self.tables_dir = other.tables_dir;
        }
        for (name, paths) in other.sources {
            let entry = self.sources.entry(name).or_default();
            if paths.input.is_some() {
                entry.input = paths.input;
            }
            if paths.output.is_some() {
                entry.output = paths.output;
            }
        }
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match self.base_dir {
            Some(ref base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Explicit argument, else the configured value resolved
    fn pick(&self, explicit: Option<PathBuf>, configured: Option<&PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| configured.map(|p| self.resolve(p)))
    }

    pub fn wiki_json_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        self.pick(explicit, self.wiki_json.as_ref())
    }

    pub fn wiki_csv_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        self.pick(explicit, self.wiki_csv.as_ref())
    }

    pub fn tables_dir_path(&self) -> Option<PathBuf> {
        self.tables_dir.as_ref().map(|p| self.resolve(p))
    }

    pub fn source_input(&self, table: &str, explicit: Option<PathBuf>) -> Option<PathBuf> {
        let configured = self.sources.get(table).and_then(|s| s.input.as_ref());
        self.pick(explicit, configured)
    }

    pub fn source_output(&self, table: &str, explicit: Option<PathBuf>) -> Option<PathBuf> {
        let configured = self.sources.get(table).and_then(|s| s.output.as_ref());
        self.pick(explicit, configured)
    }
}
