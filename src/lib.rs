//! cogdata: Cogmind game data tooling
//!
//! Reshapes spreadsheet exports of game data into the JSON the site
//! consumes, and keeps the wiki JSON document in sync with the flat CSV
//! the wiki is edited in.

pub mod cli;
pub mod core;
pub mod schema;
pub mod wiki;
