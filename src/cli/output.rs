//! Operator-facing status output
//!
//! Status lines go to stderr so that data written to stdout stays pipeable.

use console::style;
use std::fmt::Display;

use crate::cli::GlobalOpts;

/// Prints styled status lines, gated by the global quiet/verbose flags
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
    verbose: bool,
}

impl Reporter {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            quiet: global.quiet,
            verbose: global.verbose && !global.quiet,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// A step that is about to happen
    pub fn step(&self, msg: impl Display) {
        if !self.quiet {
            eprintln!("{} {}", style("→").blue(), msg);
        }
    }

    pub fn success(&self, msg: impl Display) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green(), msg);
        }
    }

    /// Warnings are printed even when quiet
    pub fn warn(&self, msg: impl Display) {
        eprintln!("{} {}", style("!").yellow(), msg);
    }

    /// Per-item detail, only with --verbose
    pub fn detail(&self, msg: impl Display) {
        if self.verbose {
            eprintln!("    {}", style(msg).dim());
        }
    }

    /// A rendered table or other multi-line block
    pub fn block(&self, text: impl Display) {
        if !self.quiet {
            eprintln!("{}", text);
        }
    }
}
