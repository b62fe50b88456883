//! `cogdata config` command - Inspect layered configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{discover_project, load_config};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only project-level config
    #[arg(long = "project-only", conflicts_with = "global_only")]
    pub project_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    if args.project_only {
        let path = project_config_path(global)?;
        return show_file("Project config:", &path);
    }
    if args.global_only {
        let path = global_config_path()?;
        return show_file("Global config:", &path);
    }

    let config = load_config(global);
    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    print_config_value("wiki_json", config.wiki_json_path(None).as_deref());
    print_config_value("wiki_csv", config.wiki_csv_path(None).as_deref());
    print_config_value("tables_dir", config.tables_dir_path().as_deref());

    for name in config.sources.keys() {
        print_config_value(
            &format!("sources.{}.input", name),
            config.source_input(name, None).as_deref(),
        );
        print_config_value(
            &format!("sources.{}.output", name),
            config.source_output(name, None).as_deref(),
        );
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line arguments");
    println!("  2. Environment variables (COGDATA_WIKI_JSON, COGDATA_WIKI_CSV, COGDATA_TABLES_DIR)");
    println!("  3. Project config (.cogdata/config.yaml)");
    println!("  4. Global config (~/.config/cogdata/config.yaml)");

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = global_config_path()?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(&global_path, 9);

    println!();
    match project_config_path(global) {
        Ok(path) => {
            println!("  {} {}", style("Project:").cyan(), path.display());
            print_exists(&path, 10);
        }
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a cogdata project)").dim()
        ),
    }

    Ok(())
}

// Helper functions

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn project_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    discover_project(global)
        .map(|project| project.config_path())
        .ok_or_else(|| {
            miette::miette!(
                help = "Run 'cogdata init' to create one",
                "Not in a cogdata project"
            )
        })
}

fn print_exists(path: &Path, pad: usize) {
    let marker = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("{:pad$}{}", "", marker, pad = pad);
}

fn print_config_value(key: &str, value: Option<&Path>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v.display()).yellow()),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn show_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }

    Ok(())
}
