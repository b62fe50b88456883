//! Reader for the game's CSV export dialect
//!
//! The exports are Excel-style CSV, except that a backslash escapes the
//! next character, inside quoted fields and out. A handful of words are
//! emitted in bare quotes inside quoted fields and have to be escaped before
//! the file will parse at all.

use csv::{ReaderBuilder, StringRecord};
use std::iter::Peekable;
use std::str::Chars;

use crate::core::reshape::ReshapeError;

/// A parsed export: the header row plus every data row
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Escape bare `"word"` quotes the exporter forgets to escape
pub fn apply_quote_fixups(text: &str, fixups: &[String]) -> String {
    let mut fixed = text.to_string();
    for word in fixups {
        let bare = format!("\"{}\"", word);
        let escaped = format!("\\\"{}\\\"", word);
        fixed = fixed.replace(&bare, &escaped);
    }
    fixed
}

fn ends_field(c: Option<&char>) -> bool {
    matches!(c, None | Some(',') | Some('\n') | Some('\r'))
}

fn copy_quoted(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    if let Some(open) = chars.next() {
        out.push(open);
    }
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' if chars.peek() == Some(&'"') => {
                if let Some(doubled) = chars.next() {
                    out.push(doubled);
                }
            }
            '"' => break,
            _ => {}
        }
    }
    // Anything between the closing quote and the delimiter is left to the reader
    while !ends_field(chars.peek()) {
        if let Some(c) = chars.next() {
            out.push(c);
        }
    }
}

fn copy_unquoted(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let mut raw = String::new();
    let mut value = String::new();
    let mut escaped = false;

    while !ends_field(chars.peek()) {
        let Some(c) = chars.next() else { break };
        raw.push(c);
        if c == '\\' {
            if let Some(next) = chars.next() {
                raw.push(next);
                value.push(next);
                escaped = true;
                continue;
            }
        }
        value.push(c);
    }

    if escaped {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(&raw);
    }
}

/// Rewrite unquoted fields that use backslash escapes as quoted fields
///
/// The `csv` reader only honours its escape character inside quotes, so an
/// unquoted `a\,b` would otherwise split into two cells.
pub fn quote_escaped_fields(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while chars.peek().is_some() {
        if chars.peek() == Some(&'"') {
            copy_quoted(&mut chars, &mut out);
        } else {
            copy_unquoted(&mut chars, &mut out);
        }
        if let Some(terminator) = chars.next() {
            out.push(terminator);
        }
    }

    out
}

/// Parse export text into a header and rows
///
/// Rows may be shorter or longer than the header; callers read missing
/// cells as empty strings.
pub fn read_export(text: &str, fixups: &[String]) -> Result<ExportTable, ReshapeError> {
    let text = quote_escaped_fields(&apply_quote_fixups(text, fixups));

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .double_quote(true)
        .escape(Some(b'\\'))
        .from_reader(text.as_bytes());

    let header = rdr
        .headers()
        .map_err(|e| ReshapeError::Csv { row: 1, message: e.to_string() })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let record: StringRecord = result.map_err(|e| ReshapeError::Csv {
            row: row_idx + 2, // +2 for 1-indexed and header row
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ExportTable { header, rows })
}

/// Get a cell, treating cells past the end of a short row as empty
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
