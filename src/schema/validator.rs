//! Schema validation of wiki documents with source-annotated errors

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use rust_embed::Embed;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// File name of the wiki document schema
pub const WIKI_SCHEMA: &str = "wiki.schema.json";

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(cogdata::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Compiled wiki document schema
pub struct Validator {
    compiled: JsonValidator,
}

impl Validator {
    /// Compile the embedded wiki schema
    pub fn new() -> Result<Self, ValidationError> {
        let text = EmbeddedSchemas::get(WIKI_SCHEMA)
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
            .unwrap_or_default();
        Self::from_schema_text(&text)
    }

    /// Compile a schema given as JSON text
    pub fn from_schema_text(text: &str) -> Result<Self, ValidationError> {
        let schema_error = |message: String| {
            let violation = SchemaViolation::new(
                message,
                "invalid schema".to_string(),
                (0, text.len().min(1)).into(),
                None,
            );
            ValidationError::new(WIKI_SCHEMA, text, vec![violation])
        };

        let schema: JsonValue = serde_json::from_str(text)
            .map_err(|e| schema_error(format!("Schema is not valid JSON: {}", e)))?;
        let compiled = validator_for(&schema)
            .map_err(|e| schema_error(format!("Schema failed to compile: {}", e)))?;
        Ok(Self { compiled })
    }

    /// Validate a wiki document, collecting every violation
    pub fn validate(&self, content: &str, filename: &str) -> Result<JsonValue, ValidationError> {
        let json_value: JsonValue = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.line(), e.column());
                let violation = SchemaViolation::new(
                    format!("JSON parse error: {}", e),
                    "invalid JSON".to_string(),
                    span,
                    Some("Check JSON syntax - commas, brackets, quotes".to_string()),
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let violations: Vec<SchemaViolation> = self
            .compiled
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &json_value, &e))
            .collect();

        if violations.is_empty() {
            Ok(json_value)
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, document: &JsonValue, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(document, error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);
    let span = find_path_span(content, document, &path);

    SchemaViolation::new(message, hint, span, help)
}

/// Name of the page an instance path points into, e.g. `/Bots/3/Spoiler`
fn page_name<'a>(document: &'a JsonValue, path: &str) -> Option<&'a str> {
    let mut parts = path.split('/').filter(|s| !s.is_empty());
    let collection = parts.next()?;
    let index: usize = parts.next()?.parse().ok()?;
    document
        .get(unescape_pointer(collection).as_str())?
        .get(index)?
        .get("Name")?
        .as_str()
}

/// Undo JSON pointer escaping of a path segment
fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn describe_location(document: &JsonValue, path: &str) -> String {
    if path.is_empty() {
        return "document root".to_string();
    }
    match page_name(document, path) {
        Some(name) => format!("'{}' (page '{}')", path, name),
        None => format!("'{}'", path),
    }
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(document: &JsonValue, error: &JsonSchemaError) -> String {
    let path = describe_location(document, &error.instance_path.to_string());

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Enum { options } => {
            format!("Invalid value at {}: must be one of: {}", path, format_enum_options(options))
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing".to_string(),
        ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        ValidationErrorKind::Enum { .. } => "invalid value".to_string(),
        ValidationErrorKind::MinLength { .. } => "too short".to_string(),
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field".to_string(),
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field to the page", prop_str))
        }
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        ValidationErrorKind::Type { kind } => Some(format!("Expected value of type: {:?}", kind)),
        ValidationErrorKind::MinLength { .. } => Some("Page names must not be empty".to_string()),
        _ => None,
    }
}

/// Span of a 1-based line/column position reported by serde_json
fn find_error_span(content: &str, line: usize, column: usize) -> SourceSpan {
    let line = line.saturating_sub(1);
    let column = column.saturating_sub(1);

    let mut offset = 0;
    for (i, line_content) in content.lines().enumerate() {
        if i == line {
            offset += column.min(line_content.len());
            break;
        }
        offset += line_content.len() + 1;
    }
    let offset = offset.min(content.len());

    let rest_of_content = &content[offset..];
    let len = rest_of_content
        .find('\n')
        .unwrap_or(rest_of_content.len())
        .max(1);

    (offset, len.min(content.len() - offset)).into()
}

/// Find the span for an instance path in JSON content
///
/// Paths into a page are located via the page's `"Name"` entry, then the
/// first matching key after it.
fn find_path_span(content: &str, document: &JsonValue, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    let first_line = || {
        let len = content.find('\n').unwrap_or(content.len()).max(1);
        SourceSpan::from((0, len.min(content.len())))
    };

    let Some(collection) = parts.first() else {
        return first_line();
    };

    // Anchor on the page when the path goes into one
    let anchor = page_name(document, json_path).and_then(|name| {
        let needle = format!("\"Name\": {}", JsonValue::String(name.to_string()));
        content
            .find(&needle)
            .or_else(|| content.find(&format!("\"Name\":{}", JsonValue::String(name.to_string()))))
    });

    if let Some(start) = anchor {
        let field = parts
            .iter()
            .skip(2)
            .find(|p| p.parse::<usize>().is_err())
            .map(|p| unescape_pointer(p));
        if let Some(field) = field {
            if let Some(span) = find_key_span(content, &field, start) {
                return span;
            }
        }
        return line_span(content, start);
    }

    find_key_span(content, &unescape_pointer(collection), 0).unwrap_or_else(first_line)
}

/// Find the span of a quoted key at or after `from`
fn find_key_span(content: &str, key: &str, from: usize) -> Option<SourceSpan> {
    let search_pattern = format!("{}:", JsonValue::String(key.to_string()));
    let rest = content.get(from..)?;
    let pos = rest.find(&search_pattern)?;
    Some(line_span(content, from + pos))
}

/// Span from `start` to the end of its line
fn line_span(content: &str, start: usize) -> SourceSpan {
    let rest = &content[start..];
    let len = rest.find('\n').unwrap_or(rest.len()).max(1);
    (start, len.min(rest.len().max(1))).into()
}
