//! Field tables that drive extraction
//!
//! A table describes one CSV export: which columns belong to which row
//! category, which fields get special treatment, and how the resulting
//! records are laid out in the output JSON. The built-in tables are YAML
//! files embedded at compile time; a same-named file in a configured
//! tables directory takes precedence.

use miette::Diagnostic;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Embed)]
#[folder = "tables/"]
struct EmbeddedTables;

/// Category key used when a table has no discriminator column
pub const ALL_ROWS: &str = "*";

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("Unknown table: {name}")]
    #[diagnostic(
        code(cogdata::table::not_found),
        help("Run `cogdata tables list` to see the available tables")
    )]
    NotFound { name: String },

    #[error("Failed to parse table {name}: {message}")]
    #[diagnostic(code(cogdata::table::parse))]
    Parse { name: String, message: String },

    #[error("Table {name} references unknown field group '{group}'")]
    #[diagnostic(code(cogdata::table::unknown_group))]
    UnknownFieldGroup { name: String, group: String },

    #[error("IO error reading table {name}: {message}")]
    #[diagnostic(code(cogdata::table::io))]
    Io { name: String, message: String },
}

/// How accepted records are laid out in the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// JSON array in row order
    #[default]
    List,
    /// JSON object keyed by record name
    Map,
    /// JSON object keyed by the joined `group_by` values
    Grouped,
}

impl std::fmt::Display for OutputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputShape::List => write!(f, "list"),
            OutputShape::Map => write!(f, "map"),
            OutputShape::Grouped => write!(f, "grouped"),
        }
    }
}

fn default_name_field() -> Option<String> {
    Some("Name".to_string())
}

/// One extraction table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractTable {
    /// Table name, also the `cogdata extract` argument
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub output: OutputShape,

    /// Indentation of the written JSON (`None` writes compact JSON)
    #[serde(default)]
    pub indent: Option<usize>,

    /// Column selecting the row category; `None` puts every row in `*`
    #[serde(default)]
    pub discriminator: Option<String>,

    /// Identity field; `None` disables renaming and uniqueness checks
    #[serde(default = "default_name_field")]
    pub name_field: Option<String>,

    /// Named lists of fields that categories are composed from
    #[serde(default)]
    pub field_groups: BTreeMap<String, Vec<String>>,

    /// Category value to the field groups (in order) its rows use
    pub categories: BTreeMap<String, Vec<String>>,

    /// Fallback values for empty cells
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Fields moved into a nested `Resistances` map
    #[serde(default)]
    pub resistances: Vec<String>,

    /// Fields parsed as part lists (`A OR B`, `Nx Item`)
    #[serde(default)]
    pub multi_value: Vec<String>,

    /// Fields split on `", "` into plain lists
    #[serde(default)]
    pub lists: Vec<String>,

    /// Fields split on blank lines into paragraphs
    #[serde(default)]
    pub paragraphs: Vec<String>,

    /// Derive `Short Name`/`Ally Name` from names like `C-17 Slicer`
    #[serde(default)]
    pub short_names: bool,

    /// Suffix appended to `Rating` for a given `Category` value
    #[serde(default)]
    pub rating_markers: BTreeMap<String, String>,

    /// Raw names whose rows are dropped
    #[serde(default)]
    pub skip: Vec<String>,

    /// Raw name to the alternates handed out in encounter order
    #[serde(default)]
    pub name_replacements: BTreeMap<String, Vec<String>>,

    /// Fixed values merged into the record with a given (final) name
    #[serde(default)]
    pub overrides: BTreeMap<String, Map<String, Value>>,

    /// Attach the accepted-row counter as `Index`
    #[serde(default)]
    pub attach_index: bool,

    /// Fields whose joined values key the output groups
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Renames applied to individual group key values
    #[serde(default)]
    pub group_renames: BTreeMap<String, String>,

    /// Words the exporter leaves in unescaped quotes
    #[serde(default)]
    pub quote_fixups: Vec<String>,
}

impl ExtractTable {
    /// Parse a table from YAML text
    pub fn from_yaml(name: &str, text: &str) -> Result<Self, TableError> {
        let table: ExtractTable = serde_yml::from_str(text).map_err(|e| TableError::Parse {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        table.check_groups()?;
        Ok(table)
    }

    /// Load a table by name, preferring `override_dir/<name>.yaml`
    pub fn load(name: &str, override_dir: Option<&Path>) -> Result<Self, TableError> {
        let text = table_source(name, override_dir)?;
        Self::from_yaml(name, &text)
    }

    fn check_groups(&self) -> Result<(), TableError> {
        for groups in self.categories.values() {
            for group in groups {
                if !self.field_groups.contains_key(group) {
                    return Err(TableError::UnknownFieldGroup {
                        name: self.name.clone(),
                        group: group.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Flattened field list for a category value
    ///
    /// Fields shared by several groups are listed once per group; the
    /// record keeps the position of the first occurrence.
    pub fn category_fields(&self, category: &str) -> Option<Vec<&str>> {
        let groups = self.categories.get(category)?;
        Some(
            groups
                .iter()
                .filter_map(|g| self.field_groups.get(g))
                .flatten()
                .map(String::as_str)
                .collect(),
        )
    }

    /// Every column the header has to provide
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        if let Some(ref disc) = self.discriminator {
            columns.push(disc);
        }
        for groups in self.categories.values() {
            for field in groups.iter().filter_map(|g| self.field_groups.get(g)).flatten() {
                if !columns.contains(&field.as_str()) {
                    columns.push(field);
                }
            }
        }
        columns
    }
}

/// YAML source of a table, preferring `override_dir/<name>.yaml`
pub fn table_source(name: &str, override_dir: Option<&Path>) -> Result<String, TableError> {
    if let Some(path) = override_path(name, override_dir) {
        return std::fs::read_to_string(&path).map_err(|e| TableError::Io {
            name: name.to_string(),
            message: e.to_string(),
        });
    }
    builtin_source(name).ok_or_else(|| TableError::NotFound {
        name: name.to_string(),
    })
}

/// Override file for a table, if one exists
pub fn override_path(name: &str, override_dir: Option<&Path>) -> Option<PathBuf> {
    let path = override_dir?.join(format!("{}.yaml", name));
    path.exists().then_some(path)
}

/// YAML source of a built-in table
pub fn builtin_source(name: &str) -> Option<String> {
    let file = EmbeddedTables::get(&format!("{}.yaml", name))?;
    std::str::from_utf8(&file.data).ok().map(str::to_string)
}

/// Names of the built-in tables, sorted
pub fn builtin_names() -> Vec<String> {
    let mut names: Vec<String> = EmbeddedTables::iter()
        .filter_map(|f| f.strip_suffix(".yaml").map(str::to_string))
        .collect();
    names.sort();
    names
}
