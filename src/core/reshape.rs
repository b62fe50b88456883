//! Row reshaping: one CSV row into one nested JSON record

use miette::Diagnostic;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::core::columns::ColumnIndex;
use crate::core::dialect::cell;
use crate::core::names::{NameResolver, UniqueNames};
use crate::core::options::{multi_value_json, VALUE_SEPARATOR};
use crate::core::table::{ExtractTable, ALL_ROWS};

/// A reshaped output entity, in field insertion order
pub type Record = Map<String, Value>;

pub const RESISTANCES_FIELD: &str = "Resistances";
pub const INDEX_FIELD: &str = "Index";
pub const RATING_FIELD: &str = "Rating";
pub const CATEGORY_FIELD: &str = "Category";
pub const SHORT_NAME_FIELD: &str = "Short Name";
pub const ALLY_NAME_FIELD: &str = "Ally Name";

static SHORT_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w-\d{2}) (.*)").unwrap());

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\r?\n").unwrap());

#[derive(Debug, Error, Diagnostic)]
pub enum ReshapeError {
    #[error("Missing column '{column}' in CSV header")]
    #[diagnostic(
        code(cogdata::reshape::missing_column),
        help("The export format changed; update the field table to match the new header")
    )]
    MissingColumn { column: String },

    #[error("Row {row}: missing required field '{field}'")]
    #[diagnostic(code(cogdata::reshape::missing_field))]
    MissingField { row: usize, field: String },

    #[error("Not enough replacement names for duplicate '{name}' ({available} available)")]
    #[diagnostic(
        code(cogdata::reshape::insufficient_alternates),
        help("Add another alternate for this name to the table's name_replacements")
    )]
    InsufficientAlternates { name: String, available: usize },

    #[error("Duplicate name '{name}'")]
    #[diagnostic(
        code(cogdata::reshape::duplicate_name),
        help("Give the duplicated name an entry in the table's name_replacements")
    )]
    DuplicateName { name: String },

    #[error("CSV parse error at row {row}: {message}")]
    #[diagnostic(code(cogdata::reshape::csv))]
    Csv { row: usize, message: String },
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(Record),
    /// Discriminator value has no category
    NoCategory(String),
    /// Name listed in the table's skip list
    Skipped(String),
}

/// Stateful reshaper for one extraction run
#[derive(Debug)]
pub struct Reshaper<'t> {
    table: &'t ExtractTable,
    columns: ColumnIndex,
    names: NameResolver,
    seen: UniqueNames,
    skip: HashSet<&'t str>,
    next_index: usize,
    renamed: usize,
}

impl<'t> Reshaper<'t> {
    /// Resolve the table's columns against a header row
    pub fn new(table: &'t ExtractTable, header: &[String]) -> Result<Self, ReshapeError> {
        let columns = ColumnIndex::resolve(header, &table.required_columns())?;
        Ok(Self {
            table,
            columns,
            names: NameResolver::new(table.name_replacements.clone()),
            seen: UniqueNames::default(),
            skip: table.skip.iter().map(String::as_str).collect(),
            next_index: 0,
            renamed: 0,
        })
    }

    /// Number of records accepted so far
    pub fn accepted(&self) -> usize {
        self.next_index
    }

    /// Number of names rewritten from the replacement table
    pub fn renamed(&self) -> usize {
        self.renamed
    }

    fn read(&self, row: &[String], field: &str) -> Option<String> {
        let value = self
            .columns
            .get(field)
            .map(|idx| cell(row, idx))
            .unwrap_or("");

        if value.is_empty() {
            self.table.defaults.get(field).cloned()
        } else {
            Some(value.to_string())
        }
    }

    /// Reshape one data row; `row_num` is only used in error messages
    pub fn reshape(&mut self, row: &[String], row_num: usize) -> Result<RowOutcome, ReshapeError> {
        let table = self.table;

        let category = match table.discriminator {
            Some(ref disc) => self.read(row, disc).unwrap_or_default(),
            None => ALL_ROWS.to_string(),
        };
        let Some(fields) = table.category_fields(&category) else {
            return Ok(RowOutcome::NoCategory(category));
        };

        let mut record = Record::new();
        let mut resistances = Map::new();
        for field in fields {
            let Some(value) = self.read(row, field) else {
                continue;
            };
            if table.resistances.iter().any(|r| r == field) {
                resistances.insert(
                    field.to_string(),
                    Value::String(value.trim_matches('%').to_string()),
                );
            } else if !record.contains_key(field) {
                record.insert(field.to_string(), Value::String(value));
            }
        }
        if !resistances.is_empty() {
            record.insert(RESISTANCES_FIELD.to_string(), Value::Object(resistances));
        }

        let raw_name = match table.name_field {
            Some(ref name_field) => Some(
                record
                    .get(name_field)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ReshapeError::MissingField {
                        row: row_num,
                        field: name_field.clone(),
                    })?,
            ),
            None => None,
        };
        if let Some(ref name) = raw_name {
            if self.skip.contains(name.as_str()) {
                return Ok(RowOutcome::Skipped(name.clone()));
            }
        }

        for field in &table.multi_value {
            if let Some(original) = record.get(field).and_then(Value::as_str).map(str::to_string) {
                record.insert(field.clone(), multi_value_json(&original));
                record.insert(format!("{} String", field), Value::String(original));
            }
        }

        for field in &table.lists {
            if let Some(value) = record.get(field).and_then(Value::as_str).map(str::to_string) {
                let items = value
                    .split(VALUE_SEPARATOR)
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                record.insert(field.clone(), Value::Array(items));
            }
        }

        for field in &table.paragraphs {
            if let Some(value) = record.get(field).and_then(Value::as_str).map(str::to_string) {
                let items = PARAGRAPH_BREAK
                    .split(&value)
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                record.insert(field.clone(), Value::Array(items));
            }
        }

        if let (Some(name_field), Some(raw_name)) = (table.name_field.as_ref(), raw_name) {
            let name = match self.names.resolve(&raw_name)? {
                Some(alternate) => {
                    self.renamed += 1;
                    record.insert(name_field.clone(), Value::String(alternate.clone()));
                    alternate
                }
                None => raw_name,
            };

            if let Some(fixed) = table.overrides.get(&name) {
                for (key, value) in fixed {
                    record.insert(key.clone(), value.clone());
                }
            }

            self.seen.claim(&name)?;

            if table.short_names {
                if let Some(caps) = SHORT_NAME_PATTERN.captures(&name) {
                    record.insert(SHORT_NAME_FIELD.to_string(), Value::String(caps[1].to_string()));
                    record.insert(ALLY_NAME_FIELD.to_string(), Value::String(caps[2].to_string()));
                }
            }
        }

        let marker = record
            .get(CATEGORY_FIELD)
            .and_then(Value::as_str)
            .and_then(|c| table.rating_markers.get(c))
            .cloned();
        if let Some(marker) = marker {
            if let Some(Value::String(rating)) = record.get_mut(RATING_FIELD) {
                rating.push_str(&marker);
            }
        }

        if table.attach_index {
            record.insert(INDEX_FIELD.to_string(), Value::from(self.next_index));
        }
        self.next_index += 1;

        Ok(RowOutcome::Accepted(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn bots_table() -> ExtractTable {
        ExtractTable::from_yaml(
            "bots",
            r#"
name: bots
field_groups:
  all: [Name, Class, Kinetic, Thermal, Armament, Immunities, Traits]
categories:
  "*": [all]
resistances: [Kinetic, Thermal]
multi_value: [Armament]
lists: [Immunities]
paragraphs: [Traits]
short_names: true
skip: [Anomaly]
name_replacements:
  X: [X-A, X-B]
overrides:
  Cogmind:
    Class: Cogmind
  C-17 Slicer:
    Overload Speed: 20
attach_index: true
"#,
        )
        .unwrap()
    }

    fn accepted(outcome: RowOutcome) -> Record {
        match outcome {
            RowOutcome::Accepted(record) => record,
            other => panic!("expected accepted row, got {:?}", other),
        }
    }

    const BOT_HEADER: &[&str] = &["Name", "Class", "Kinetic", "Thermal", "Armament", "Immunities", "Traits"];

    #[test]
    fn test_resistances_nested_and_stripped() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let record = accepted(
            reshaper
                .reshape(&row(&["Grunt", "Grunt", "30%", "", "", "", ""]), 2)
                .unwrap(),
        );

        assert_eq!(record["Resistances"], json!({"Kinetic": "30"}));
        assert!(!record.contains_key("Kinetic"));
        assert!(!record.contains_key("Thermal"));
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, vec!["Name", "Class", "Resistances", "Index"]);
    }

    #[test]
    fn test_multi_value_list_and_paragraph_fields() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let record = accepted(
            reshaper
                .reshape(
                    &row(&[
                        "C-17 Slicer",
                        "Swordsman",
                        "",
                        "",
                        "2x Blade OR Axe",
                        "Jamming, Hacking",
                        "First\r\n\r\nSecond",
                    ]),
                    2,
                )
                .unwrap(),
        );

        assert_eq!(record["Armament"], json!([[{"name": "Blade", "number": 2}, {"name": "Axe"}]]));
        assert_eq!(record["Armament String"], json!("2x Blade OR Axe"));
        assert_eq!(record["Immunities"], json!(["Jamming", "Hacking"]));
        assert_eq!(record["Traits"], json!(["First", "Second"]));
        assert_eq!(record["Short Name"], json!("C-17"));
        assert_eq!(record["Ally Name"], json!("Slicer"));
        assert_eq!(record["Overload Speed"], json!(20));
    }

    #[test]
    fn test_name_replacement_sequence() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let blank = |name: &str| row(&[name, "", "", "", "", "", ""]);

        let first = accepted(reshaper.reshape(&blank("X"), 2).unwrap());
        let second = accepted(reshaper.reshape(&blank("X"), 3).unwrap());
        assert_eq!(first["Name"], json!("X-A"));
        assert_eq!(second["Name"], json!("X-B"));
        assert_eq!(reshaper.renamed(), 2);

        assert!(matches!(
            reshaper.reshape(&blank("X"), 4),
            Err(ReshapeError::InsufficientAlternates { .. })
        ));
    }

    #[test]
    fn test_duplicate_name_fatal() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let blank = |name: &str| row(&[name, "", "", "", "", "", ""]);

        reshaper.reshape(&blank("Grunt"), 2).unwrap();
        assert!(matches!(
            reshaper.reshape(&blank("Grunt"), 3),
            Err(ReshapeError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_skipped_rows_do_not_advance_index() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let blank = |name: &str| row(&[name, "", "", "", "", "", ""]);

        let first = accepted(reshaper.reshape(&blank("Grunt"), 2).unwrap());
        assert_eq!(
            reshaper.reshape(&blank("Anomaly"), 3).unwrap(),
            RowOutcome::Skipped("Anomaly".to_string())
        );
        let second = accepted(reshaper.reshape(&blank("Watcher"), 4).unwrap());

        assert_eq!(first["Index"], json!(0));
        assert_eq!(second["Index"], json!(1));
        assert_eq!(reshaper.accepted(), 2);
    }

    #[test]
    fn test_missing_name_is_schema_error() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        match reshaper.reshape(&row(&["", "Grunt", "", "", "", "", ""]), 7) {
            Err(ReshapeError::MissingField { row, field }) => {
                assert_eq!(row, 7);
                assert_eq!(field, "Name");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_override_replaces_in_place() {
        let table = bots_table();
        let mut reshaper = Reshaper::new(&table, &header(BOT_HEADER)).unwrap();
        let record = accepted(
            reshaper
                .reshape(&row(&["Cogmind", "Player", "", "", "", "", ""]), 2)
                .unwrap(),
        );
        assert_eq!(record["Class"], json!("Cogmind"));
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, vec!["Name", "Class", "Index"]);
    }

    fn parts_table() -> ExtractTable {
        ExtractTable::from_yaml(
            "parts",
            r#"
name: parts
output: map
discriminator: Slot
field_groups:
  all: [Slot]
  overview: [Name, Rating, Category, Mass]
categories:
  Power: [all, overview]
defaults:
  Mass: "0"
rating_markers:
  Prototype: "*"
  Alien: "**"
attach_index: true
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_category_selection_defaults_and_markers() {
        let table = parts_table();
        let mut reshaper =
            Reshaper::new(&table, &header(&["Name", "Slot", "Rating", "Category", "Mass"])).unwrap();

        let proto = accepted(
            reshaper
                .reshape(&row(&["Ion Engine", "Power", "3", "Prototype", ""]), 2)
                .unwrap(),
        );
        assert_eq!(proto["Rating"], json!("3*"));
        assert_eq!(proto["Mass"], json!("0"));

        assert_eq!(
            reshaper
                .reshape(&row(&["Matter", "N/A", "1", "", ""]), 3)
                .unwrap(),
            RowOutcome::NoCategory("N/A".to_string())
        );

        let alien = accepted(
            reshaper
                .reshape(&row(&["Sigix Core", "Power", "9", "Alien", "2"]), 4)
                .unwrap(),
        );
        assert_eq!(alien["Rating"], json!("9**"));
        assert_eq!(alien["Index"], json!(1));
    }
}
