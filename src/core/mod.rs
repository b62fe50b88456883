//! Core module - extraction engine, tables, and project configuration

pub mod columns;
pub mod config;
pub mod dialect;
pub mod extract;
pub mod names;
pub mod options;
pub mod project;
pub mod reshape;
pub mod table;

pub use columns::ColumnIndex;
pub use config::{Config, SourcePaths};
pub use extract::{extract, to_json_text, ExtractStats, Extraction};
pub use names::{NameResolver, UniqueNames};
pub use options::{parse_multi_value, Alternative, OptionEntry};
pub use project::{Project, ProjectError};
pub use reshape::{Record, ReshapeError, Reshaper, RowOutcome};
pub use table::{ExtractTable, OutputShape, TableError};
