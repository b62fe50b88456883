//! `cogdata init` command - Initialize a new cogdata project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::{GlobalOpts, Reporter};
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .cogdata/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let reporter = Reporter::new(global);
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        reporter.success(format!("Created directory {}", style(path.display()).cyan()));
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            reporter.success(format!(
                "Initialized cogdata project at {}",
                style(project.root().display()).cyan()
            ));
            print_next_steps(&reporter, project.root());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            reporter.warn(format!(
                "cogdata project already exists at {}",
                style(path.display()).cyan()
            ));
            reporter.block(format!(
                "\nUse {} to reset its configuration",
                style("cogdata init --force").yellow()
            ));
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_next_steps(reporter: &Reporter, root: &Path) {
    reporter.block(format!(
        "\nEdit {} to point at your exports and wiki files.\n\nNext steps:\n  {} Convert a bot export\n  {} Push wiki JSON changes to the CSV\n  {} Pull CSV edits into the wiki JSON",
        style(root.join(".cogdata/config.yaml").display()).cyan(),
        style("cogdata extract bots").yellow(),
        style("cogdata wiki to-csv").yellow(),
        style("cogdata wiki to-json").yellow(),
    ));
}
