//! `cogdata validate` command - Check a wiki document against its schema

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::wiki::load_document;
use crate::cli::helpers::{load_config, require_path};
use crate::cli::{GlobalOpts, Reporter};
use crate::wiki::PageType;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Wiki JSON document (default: wiki_json from config)
    pub path: Option<PathBuf>,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let reporter = Reporter::new(global);
    let config = load_config(global);
    let path = require_path(
        config.wiki_json_path(args.path),
        "wiki JSON path",
        "wiki_json",
        "a path argument",
    )?;

    reporter.step(format!("Validating {}", style(path.display()).cyan()));
    let doc = load_document(&path)?;

    for page_type in PageType::all() {
        let count = match doc.collection(*page_type) {
            Some(pages) => pages.len().to_string(),
            None => "absent".to_string(),
        };
        reporter.detail(format!("{}: {}", page_type.collection(), count));
    }
    reporter.success(format!(
        "{} is valid ({} pages)",
        style(path.display()).cyan(),
        doc.page_count()
    ));
    Ok(())
}
