//! Wiki content: the nested JSON document, its flat CSV projection, and
//! the reconciliation between the two
//!
//! The JSON document is authoritative for structure (which pages exist and
//! in which collection); the CSV is authoritative for text (content and
//! spoiler level) and group membership edits.

pub mod escape;
pub mod flat;
pub mod page;
pub mod reconcile;

use miette::Diagnostic;
use thiserror::Error;

pub use flat::{read_flat, write_flat, FlatRow, FLAT_COLUMNS};
pub use page::{ListField, PageType, Spoiler, WikiDocument, WikiPage};
pub use reconcile::{bootstrap, csv_to_json, json_to_csv, seed_pages, FlatSync, JsonSync, SeedReport};

#[derive(Debug, Error, Diagnostic)]
pub enum WikiError {
    #[error("Page '{name}' has unknown page type '{page_type}'")]
    #[diagnostic(
        code(cogdata::wiki::unknown_page_type),
        help("Valid page types: Bot, Bot Group, Bot Supergroup, Part, Part Group, Part Supergroup, Location, Other")
    )]
    UnknownPageType { name: String, page_type: String },

    #[error("Found new page '{name}' with type {page_type}; only Other pages can be added from the CSV")]
    #[diagnostic(
        code(cogdata::wiki::unexpected_new_page),
        help("Bot and part pages come from the extracted game data; run `cogdata wiki seed` first")
    )]
    UnexpectedNewPage { name: String, page_type: String },

    #[error("Page '{name}' needs the {collection} collection, which the wiki JSON does not have")]
    #[diagnostic(
        code(cogdata::wiki::missing_collection),
        help("Add an empty \"{collection}\" list to the wiki JSON, or fix the page's type")
    )]
    MissingCollection { name: String, collection: String },

    #[error("Page '{name}' appears in both {first} and {second}")]
    #[diagnostic(code(cogdata::wiki::duplicate_page))]
    DuplicatePage {
        name: String,
        first: String,
        second: String,
    },

    #[error("Page '{name}' has invalid spoiler level '{value}'")]
    #[diagnostic(
        code(cogdata::wiki::invalid_spoiler),
        help("Spoiler must be empty, None, Spoiler, or Redacted")
    )]
    InvalidSpoiler { name: String, value: String },

    #[error("Found {} wiki CSV entries not present in the JSON: {}", names.len(), names.join(", "))]
    #[diagnostic(
        code(cogdata::wiki::orphans),
        help("Use --force to delete these entries from the CSV")
    )]
    Orphans { names: Vec<String> },

    #[error("Entry {index} of {source_name} has no Name")]
    #[diagnostic(code(cogdata::wiki::missing_name))]
    MissingName { source_name: String, index: usize },

    #[error("CSV error at row {row}: {message}")]
    #[diagnostic(code(cogdata::wiki::csv))]
    Csv { row: usize, message: String },

    #[error("JSON error: {0}")]
    #[diagnostic(code(cogdata::wiki::json))]
    Json(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(cogdata::wiki::io))]
    Io(String),
}
