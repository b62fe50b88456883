//! Extraction pipeline: a whole CSV export into one JSON document

use serde_json::{Map, Value};

use crate::core::dialect::read_export;
use crate::core::reshape::{Record, ReshapeError, Reshaper, RowOutcome};
use crate::core::table::{ExtractTable, OutputShape};

/// Result of one extraction run
#[derive(Debug, Clone)]
pub struct Extraction {
    pub document: Value,
    pub stats: ExtractStats,
    /// Rows dropped, with the reason, in row order
    pub dropped: Vec<(usize, String)>,
}

/// Extraction statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub rows_read: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub uncategorized: usize,
    pub renamed: usize,
}

/// Run a table over CSV export text
pub fn extract(table: &ExtractTable, csv_text: &str) -> Result<Extraction, ReshapeError> {
    let export = read_export(csv_text, &table.quote_fixups)?;
    let mut reshaper = Reshaper::new(table, &export.header)?;

    let mut stats = ExtractStats::default();
    let mut dropped = Vec::new();
    let mut records = Vec::new();

    for (row_idx, row) in export.rows.iter().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_read += 1;

        match reshaper.reshape(row, row_num)? {
            RowOutcome::Accepted(record) => records.push((row_num, record)),
            RowOutcome::Skipped(name) => {
                stats.skipped += 1;
                dropped.push((row_num, format!("skipped {}", name)));
            }
            RowOutcome::NoCategory(category) => {
                stats.uncategorized += 1;
                dropped.push((row_num, format!("no category for '{}'", category)));
            }
        }
    }

    stats.accepted = reshaper.accepted();
    stats.renamed = reshaper.renamed();

    let document = shape_output(table, records)?;
    Ok(Extraction {
        document,
        stats,
        dropped,
    })
}

fn record_name(table: &ExtractTable, record: &Record) -> Option<String> {
    let field = table.name_field.as_ref()?;
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

fn shape_output(table: &ExtractTable, records: Vec<(usize, Record)>) -> Result<Value, ReshapeError> {
    match table.output {
        OutputShape::List => Ok(Value::Array(
            records.into_iter().map(|(_, r)| Value::Object(r)).collect(),
        )),
        OutputShape::Map => {
            let mut out = Map::new();
            for (row_num, record) in records {
                let name = record_name(table, &record).ok_or_else(|| ReshapeError::MissingField {
                    row: row_num,
                    field: table.name_field.clone().unwrap_or_else(|| "Name".to_string()),
                })?;
                out.insert(name, Value::Object(record));
            }
            Ok(Value::Object(out))
        }
        OutputShape::Grouped => {
            let mut out = Map::new();
            for (row_num, mut record) in records {
                let key = group_key(table, &mut record, row_num)?;
                if let Value::Array(items) = out
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    items.push(Value::Object(record));
                }
            }
            Ok(Value::Object(out))
        }
    }
}

/// Remove the grouping fields from a record and join them into its group key
fn group_key(table: &ExtractTable, record: &mut Record, row_num: usize) -> Result<String, ReshapeError> {
    let mut parts = Vec::with_capacity(table.group_by.len());
    for field in &table.group_by {
        let value = record
            .shift_remove(field)
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| ReshapeError::MissingField {
                row: row_num,
                field: field.clone(),
            })?;
        let value = table.group_renames.get(&value).cloned().unwrap_or(value);
        parts.push(value);
    }
    Ok(parts.join(" "))
}

/// Serialize an extracted document with the table's indentation
pub fn to_json_text(document: &Value, indent: Option<usize>) -> Result<String, serde_json::Error> {
    let mut text = match indent {
        Some(width) => {
            let indent = vec![b' '; width];
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            serde::Serialize::serialize(document, &mut ser)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        None => serde_json::to_string(document)?,
    };
    text.push('\n');
    Ok(text)
}
