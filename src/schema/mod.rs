//! Schema system - validation of wiki documents

pub mod validator;

pub use validator::{SchemaViolation, ValidationError, Validator, WIKI_SCHEMA};
