//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory at a project root
pub const PROJECT_DIR: &str = ".cogdata";

/// Represents a cogdata project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .cogdata/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_structure(root)
    }

    /// Initialize even if .cogdata/ exists, resetting its config
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::write_structure(root)
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(project_dir.join("tables"))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# cogdata project configuration
# Relative paths are resolved against the project root.

# Wiki document and its flat CSV projection
# wiki_json: src/json/wiki.json
# wiki_csv: utils/wiki.csv

# Directory whose <table>.yaml files replace the built-in tables
# tables_dir: .cogdata/tables

# Default input/output per extraction table
# sources:
#   bots:
#     input: utils/robots_export.csv
#     output: src/json/bots.json
#   parts:
#     input: utils/gallery_export.csv
#     output: src/json/items.json
#   lore:
#     input: utils/lore_export.csv
#     output: src/json/lore.json
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .cogdata configuration directory
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the project config file path
    pub fn config_path(&self) -> PathBuf {
        self.project_dir().join("config.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a cogdata project (searched from {searched_from:?}). Run 'cogdata init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("cogdata project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
