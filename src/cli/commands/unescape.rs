//! `cogdata unescape` command - Rewrite literal `\n` sequences as newlines

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{plural, read_text, write_text};
use crate::cli::{GlobalOpts, Reporter};
use crate::wiki::escape::unescape_newlines;

#[derive(clap::Args, Debug)]
pub struct UnescapeArgs {
    /// File to rewrite in place
    pub path: PathBuf,
}

pub fn run(args: UnescapeArgs, global: &GlobalOpts) -> Result<()> {
    let reporter = Reporter::new(global);
    let text = read_text(&args.path)?;
    let count = text.matches("\\n").count();

    if count == 0 {
        reporter.success(format!("No escaped newlines in {}", style(args.path.display()).cyan()));
        return Ok(());
    }

    write_text(&args.path, &unescape_newlines(&text))?;
    reporter.success(format!(
        "Replaced {} escaped newline{} in {}",
        count,
        plural(count),
        style(args.path.display()).cyan()
    ));
    Ok(())
}
