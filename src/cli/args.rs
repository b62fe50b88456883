//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, extract::ExtractArgs, init::InitArgs,
    tables::TablesCommands, unescape::UnescapeArgs, validate::ValidateArgs, wiki::WikiCommands,
};

#[derive(Parser)]
#[command(name = "cogdata")]
#[command(author, version, about = "Cogmind game data extraction and wiki sync")]
#[command(long_about = "Reshapes spreadsheet exports of Cogmind game data into JSON and keeps the wiki document and its flat CSV in sync.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .cogdata/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cogdata project
    Init(InitArgs),

    /// Convert a game data CSV export to JSON
    Extract(ExtractArgs),

    /// Sync the wiki JSON document and the wiki CSV
    #[command(subcommand)]
    Wiki(WikiCommands),

    /// Replace escaped newlines in a file with real newlines
    Unescape(UnescapeArgs),

    /// Validate a wiki JSON document against its schema
    Validate(ValidateArgs),

    /// Inspect extraction tables
    #[command(subcommand)]
    Tables(TablesCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
