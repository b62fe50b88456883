//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{miette, IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::{Config, Project};

/// Find the project for this invocation, honoring `--project`
pub fn discover_project(global: &GlobalOpts) -> Option<Project> {
    match global.project {
        Some(ref root) => Project::discover_from(root).ok(),
        None => Project::discover().ok(),
    }
}

/// Load layered configuration for this invocation
pub fn load_config(global: &GlobalOpts) -> Config {
    let project = discover_project(global);
    Config::load_layers(
        Config::global_config_path().as_deref(),
        project.as_ref(),
        |key| std::env::var(key).ok(),
    )
}

/// Unwrap a path that may come from the command line or configuration
pub fn require_path(path: Option<PathBuf>, what: &str, config_key: &str, flag: &str) -> Result<PathBuf> {
    path.ok_or_else(|| {
        miette!(
            help = format!("Pass {} or set '{}' in .cogdata/config.yaml", flag, config_key),
            "No {} given",
            what
        )
    })
}

/// Read a whole file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))
}

/// Write a whole file, creating parent directories as needed
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plural suffix for counts in status lines
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Lüftung über alles", 8), "Lüftu...");
    }

    #[test]
    fn test_write_text_creates_parents() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("src/json/bots.json");
        write_text(&path, "[]\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "[]\n");
    }

    #[test]
    fn test_require_path_reports_missing() {
        let err = require_path(None, "wiki JSON path", "wiki_json", "--json").unwrap_err();
        assert!(err.to_string().contains("wiki JSON path"));
        assert!(require_path(Some(PathBuf::from("a.json")), "x", "y", "--z").is_ok());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(2), "s");
    }
}
