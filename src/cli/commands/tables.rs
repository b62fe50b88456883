//! `cogdata tables` command - Inspect extraction tables

use clap::Subcommand;
use console::style;
use miette::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::table::{builtin_names, override_path, table_source};
use crate::core::ExtractTable;

#[derive(Subcommand, Debug)]
pub enum TablesCommands {
    /// List available tables
    List,

    /// Print a table's YAML definition
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Table name
    pub name: String,
}

pub fn run(cmd: TablesCommands, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let override_dir = config.tables_dir_path();
    match cmd {
        TablesCommands::List => run_list(override_dir.as_deref()),
        TablesCommands::Show(args) => {
            print!("{}", table_source(&args.name, override_dir.as_deref())?);
            Ok(())
        }
    }
}

/// Built-in table names plus any `*.yaml` in the override directory
fn available_names(override_dir: Option<&Path>) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = builtin_names().into_iter().collect();
    if let Some(entries) = override_dir.and_then(|dir| std::fs::read_dir(dir).ok()) {
        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            if let Some(stem) = file_name.to_str().and_then(|f| f.strip_suffix(".yaml")) {
                names.insert(stem.to_string());
            }
        }
    }
    names
}

fn run_list(override_dir: Option<&Path>) -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Name", "Output", "Discriminator", "Categories", "Source", "Description"]);

    for name in available_names(override_dir) {
        let table = ExtractTable::load(&name, override_dir)?;
        let source = if override_path(&name, override_dir).is_some() {
            style("override").yellow().to_string()
        } else {
            "built-in".to_string()
        };
        builder.push_record([
            table.name.clone(),
            table.output.to_string(),
            table.discriminator.clone().unwrap_or_else(|| "-".to_string()),
            table.categories.len().to_string(),
            source,
            truncate_str(&table.description, 50),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::markdown());
    println!("{}", table);
    Ok(())
}
