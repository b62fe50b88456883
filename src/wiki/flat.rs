//! Flat (CSV) representation of the wiki

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::wiki::escape::strip_writer_artifact;
use crate::wiki::page::ListField;
use crate::wiki::WikiError;

/// Columns of the flat wiki table, in order
pub const FLAT_COLUMNS: [&str; 10] = [
    "Name",
    "Page Type",
    "Content",
    "Spoiler",
    "Bots",
    "Part Category",
    "Parts",
    "Groups",
    "Supergroups",
    "Subpages",
];

/// Separator of list-valued cells
pub const LIST_SEPARATOR: char = ',';

/// One row of the flat wiki table
///
/// Every cell is a plain string; an empty string means "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Page Type", default)]
    pub page_type: String,

    #[serde(rename = "Content", default)]
    pub content: String,

    #[serde(rename = "Spoiler", default)]
    pub spoiler: String,

    #[serde(rename = "Bots", default)]
    pub bots: String,

    #[serde(rename = "Part Category", default)]
    pub part_category: String,

    #[serde(rename = "Parts", default)]
    pub parts: String,

    #[serde(rename = "Groups", default)]
    pub groups: String,

    #[serde(rename = "Supergroups", default)]
    pub supergroups: String,

    #[serde(rename = "Subpages", default)]
    pub subpages: String,
}

impl FlatRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn list_cell(&self, field: ListField) -> &str {
        match field {
            ListField::Bots => &self.bots,
            ListField::Parts => &self.parts,
            ListField::Groups => &self.groups,
            ListField::Supergroups => &self.supergroups,
            ListField::Subpages => &self.subpages,
        }
    }

    pub fn list_cell_mut(&mut self, field: ListField) -> &mut String {
        match field {
            ListField::Bots => &mut self.bots,
            ListField::Parts => &mut self.parts,
            ListField::Groups => &mut self.groups,
            ListField::Supergroups => &mut self.supergroups,
            ListField::Subpages => &mut self.subpages,
        }
    }
}

/// Split a list cell; an empty cell is no list at all
pub fn split_list(cell: &str) -> Option<Vec<String>> {
    if cell.is_empty() {
        return None;
    }
    Some(cell.split(LIST_SEPARATOR).map(str::to_string).collect())
}

/// Join a list back into a cell
pub fn join_list(items: Option<&Vec<String>>) -> String {
    items
        .map(|v| v.join(&LIST_SEPARATOR.to_string()))
        .unwrap_or_default()
}

/// Parse the flat table, keeping file order
///
/// Older tables that lack trailing columns read those cells as empty.
pub fn read_flat(text: &str) -> Result<Vec<FlatRow>, WikiError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (row_idx, result) in rdr.deserialize::<FlatRow>().enumerate() {
        let row = result.map_err(|e| WikiError::Csv {
            row: row_idx + 2,
            message: e.to_string(),
        })?;
        if !seen.insert(row.name.clone()) {
            return Err(WikiError::DuplicatePage {
                name: row.name,
                first: "the wiki CSV".to_string(),
                second: "the wiki CSV".to_string(),
            });
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Write the flat table: all cells quoted, rows sorted by name
///
/// Only the Content cell gets the writer-artifact fix; names and list cells
/// are written exactly as given.
pub fn write_flat(rows: &[FlatRow]) -> Result<String, WikiError> {
    let mut sorted: Vec<&FlatRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    // Written by hand so an empty table still gets its header
    wtr.write_record(FLAT_COLUMNS).map_err(|e| WikiError::Csv {
        row: 1,
        message: e.to_string(),
    })?;

    for row in sorted {
        let row = FlatRow {
            content: strip_writer_artifact(&row.content),
            ..row.clone()
        };
        wtr.serialize(&row).map_err(|e| WikiError::Csv {
            row: 0,
            message: e.to_string(),
        })?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| WikiError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| WikiError::Io(e.to_string()))
}
