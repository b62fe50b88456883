//! `cogdata extract` command - CSV export to JSON

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, plural, read_text, require_path, write_text};
use crate::cli::{GlobalOpts, Reporter};
use crate::core::{extract, to_json_text, ExtractStats, ExtractTable};

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Extraction table (bots, parts, lore, or a custom table name)
    pub table: String,

    /// CSV export to read (default: sources.<table>.input from config)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// JSON file to write (default: sources.<table>.output, else stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExtractArgs, global: &GlobalOpts) -> Result<()> {
    let reporter = Reporter::new(global);
    let config = load_config(global);

    let table = ExtractTable::load(&args.table, config.tables_dir_path().as_deref())?;
    let input = require_path(
        config.source_input(&table.name, args.input),
        "input CSV",
        &format!("sources.{}.input", table.name),
        "--input",
    )?;
    let output = config.source_output(&table.name, args.output);

    reporter.step(format!(
        "Extracting {} from {}",
        style(&table.name).cyan(),
        style(input.display()).cyan()
    ));

    let csv_text = read_text(&input)?;
    let extraction = extract(&table, &csv_text)?;

    for (row, reason) in &extraction.dropped {
        reporter.detail(format!("row {}: {}", row, reason));
    }

    let json = to_json_text(&extraction.document, table.indent).into_diagnostic()?;

    match output {
        Some(path) => {
            write_text(&path, &json)?;
            reporter.success(format!(
                "Wrote {} record{} to {}",
                extraction.stats.accepted,
                plural(extraction.stats.accepted),
                style(path.display()).cyan()
            ));
        }
        None => print!("{}", json),
    }

    if reporter.is_verbose() {
        reporter.block(summary_table(&extraction.stats));
    }

    Ok(())
}

fn summary_table(stats: &ExtractStats) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Rows read", "Accepted", "Skipped", "No category", "Renamed"]);
    builder.push_record([
        stats.rows_read.to_string(),
        stats.accepted.to_string(),
        stats.skipped.to_string(),
        stats.uncategorized.to_string(),
        stats.renamed.to_string(),
    ]);
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
