//! CLI command implementations

pub mod completions;
pub mod config;
pub mod extract;
pub mod init;
pub mod tables;
pub mod unescape;
pub mod validate;
pub mod wiki;
