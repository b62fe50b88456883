//! `cogdata wiki` command - Sync the wiki JSON document and the wiki CSV

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, plural, read_text, require_path, truncate_str, write_text};
use crate::cli::{GlobalOpts, Reporter};
use crate::core::Config;
use crate::schema::Validator;
use crate::wiki::{
    bootstrap, csv_to_json, json_to_csv, read_flat, seed_pages, write_flat, FlatRow, WikiDocument,
};

/// Default file for `--write-diffs` without a value
const DIFFS_FILE: &str = "diffs.txt";

#[derive(Subcommand, Debug)]
pub enum WikiCommands {
    /// Update the wiki JSON from edits made in the wiki CSV
    ToJson(ToJsonArgs),

    /// Regenerate the wiki CSV from the wiki JSON
    ToCsv(ToCsvArgs),

    /// Add empty pages for extracted bots and parts the wiki lacks
    Seed(SeedArgs),

    /// Build a new wiki JSON document from a wiki CSV
    Bootstrap(BootstrapArgs),
}

/// Paths shared by the sync subcommands
#[derive(clap::Args, Debug)]
pub struct WikiPaths {
    /// Wiki JSON document (default: wiki_json from config)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Wiki CSV (default: wiki_csv from config)
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ToJsonArgs {
    #[command(flatten)]
    pub paths: WikiPaths,

    /// Write the names of updated pages to a file
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DIFFS_FILE)]
    pub write_diffs: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ToCsvArgs {
    #[command(flatten)]
    pub paths: WikiPaths,

    /// Delete CSV entries that don't exist in the JSON
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct SeedArgs {
    /// Wiki JSON document (default: wiki_json from config)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Extracted bots JSON (default: sources.bots.output from config)
    #[arg(long)]
    pub bots: Option<PathBuf>,

    /// Extracted parts JSON (default: sources.parts.output from config)
    #[arg(long)]
    pub parts: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct BootstrapArgs {
    /// Wiki CSV to read
    pub csv: PathBuf,

    /// Wiki JSON document to create
    pub json: PathBuf,

    /// Overwrite the JSON document if it exists
    #[arg(long)]
    pub force: bool,
}

/// Run a wiki subcommand
pub fn run(cmd: WikiCommands, global: &GlobalOpts) -> Result<()> {
    let reporter = Reporter::new(global);
    let config = load_config(global);
    match cmd {
        WikiCommands::ToJson(args) => run_to_json(args, &config, &reporter),
        WikiCommands::ToCsv(args) => run_to_csv(args, &config, &reporter),
        WikiCommands::Seed(args) => run_seed(args, &config, &reporter),
        WikiCommands::Bootstrap(args) => run_bootstrap(args, &reporter),
    }
}

fn json_path(config: &Config, explicit: Option<PathBuf>) -> Result<PathBuf> {
    require_path(config.wiki_json_path(explicit), "wiki JSON path", "wiki_json", "--json")
}

fn csv_path(config: &Config, explicit: Option<PathBuf>) -> Result<PathBuf> {
    require_path(config.wiki_csv_path(explicit), "wiki CSV path", "wiki_csv", "--csv")
}

/// Read and schema-check a wiki document
pub fn load_document(path: &Path) -> Result<WikiDocument> {
    let text = read_text(path)?;
    let filename = path.display().to_string();
    Validator::new()?.validate(&text, &filename)?;
    Ok(WikiDocument::from_json(&text)?)
}

fn save_document(path: &Path, doc: &WikiDocument) -> Result<()> {
    write_text(path, &doc.to_json()?)
}

fn run_to_json(args: ToJsonArgs, config: &Config, reporter: &Reporter) -> Result<()> {
    let json = json_path(config, args.paths.json)?;
    let csv = csv_path(config, args.paths.csv)?;

    reporter.step(format!(
        "Applying {} to {}",
        style(csv.display()).cyan(),
        style(json.display()).cyan()
    ));

    let mut doc = load_document(&json)?;
    let rows = read_flat(&read_text(&csv)?)?;
    let sync = csv_to_json(&mut doc, &rows)?;

    save_document(&json, &doc)?;

    if sync.is_unchanged() {
        reporter.success("No changes");
        return Ok(());
    }

    for name in &sync.added {
        reporter.detail(format!("added {}", name));
    }
    reporter.success(format!(
        "Updated {} page{} ({} new)",
        sync.updated.len(),
        plural(sync.updated.len()),
        sync.added.len()
    ));
    for name in &sync.updated {
        reporter.detail(name);
    }

    if let Some(path) = args.write_diffs {
        write_text(&path, &sync.updated.join("\n"))?;
        reporter.success(format!("Wrote page list to {}", style(path.display()).cyan()));
    }

    Ok(())
}

fn run_to_csv(args: ToCsvArgs, config: &Config, reporter: &Reporter) -> Result<()> {
    let json = json_path(config, args.paths.json)?;
    let csv = csv_path(config, args.paths.csv)?;

    reporter.step(format!(
        "Regenerating {} from {}",
        style(csv.display()).cyan(),
        style(json.display()).cyan()
    ));

    let doc = load_document(&json)?;
    let rows = if csv.exists() {
        read_flat(&read_text(&csv)?)?
    } else {
        reporter.warn(format!("{} does not exist yet; creating it", csv.display()));
        Vec::new()
    };

    let sync = json_to_csv(&doc, rows)?;
    for name in &sync.added {
        reporter.detail(format!("added {}", name));
    }

    if !sync.orphans.is_empty() {
        reporter.warn(format!(
            "Found {} wiki CSV entr{} not present in the JSON",
            sync.orphans.len(),
            if sync.orphans.len() == 1 { "y" } else { "ies" }
        ));
        reporter.block(orphan_table(&sync.rows, &sync.orphans));
        if args.force {
            reporter.warn("Force updating and deleting entries");
        }
    }

    let added = sync.added.len();
    let rows = sync.resolve_orphans(args.force)?;
    write_text(&csv, &write_flat(&rows)?)?;

    reporter.success(format!(
        "Wrote {} row{} to {} ({} new)",
        rows.len(),
        plural(rows.len()),
        style(csv.display()).cyan(),
        added
    ));
    Ok(())
}

fn orphan_table(rows: &[FlatRow], orphans: &[String]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Name", "Page Type", "Content"]);
    for row in rows.iter().filter(|r| orphans.contains(&r.name)) {
        builder.push_record([
            row.name.clone(),
            row.page_type.clone(),
            truncate_str(&row.content, 40),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn read_extracted(path: &Path) -> Result<Value> {
    serde_json::from_str(&read_text(path)?).into_diagnostic()
}

fn run_seed(args: SeedArgs, config: &Config, reporter: &Reporter) -> Result<()> {
    let json = json_path(config, args.json)?;
    let bots_path = config.source_output("bots", args.bots);
    let parts_path = config.source_output("parts", args.parts);

    if bots_path.is_none() && parts_path.is_none() {
        return Err(miette::miette!(
            help = "Pass --bots/--parts or set sources.bots.output / sources.parts.output",
            "Nothing to seed from"
        ));
    }

    let bots = bots_path.as_deref().map(read_extracted).transpose()?;
    let parts = parts_path.as_deref().map(read_extracted).transpose()?;

    let mut doc = load_document(&json)?;
    let report = seed_pages(&mut doc, bots.as_ref(), parts.as_ref())?;
    save_document(&json, &doc)?;

    for name in report.bots.iter().chain(&report.parts) {
        reporter.detail(format!("added {}", name));
    }
    reporter.success(format!(
        "Added {} bot page{} and {} part page{} to {}",
        report.bots.len(),
        plural(report.bots.len()),
        report.parts.len(),
        plural(report.parts.len()),
        style(json.display()).cyan()
    ));
    Ok(())
}

fn run_bootstrap(args: BootstrapArgs, reporter: &Reporter) -> Result<()> {
    if args.json.exists() && !args.force {
        return Err(miette::miette!(
            help = "Use --force to overwrite it",
            "{} already exists",
            args.json.display()
        ));
    }

    let rows = read_flat(&read_text(&args.csv)?)?;
    let doc = bootstrap(&rows)?;
    save_document(&args.json, &doc)?;

    reporter.success(format!(
        "Created {} with {} page{}",
        style(args.json.display()).cyan(),
        doc.page_count(),
        plural(doc.page_count())
    ));
    Ok(())
}
