//! Terminal output for the CLI
//!
//! Colored status lines gated by verbosity, plus a progress bar for batch
//! review. Errors and warnings go to stderr and are never silenced.

use crate::analysis::{ConvergenceOutcome, ConvergenceReport};
use crate::cli::Verbosity;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Verbosity-aware terminal printer
#[derive(Debug, Clone, Copy)]
pub struct Display {
    verbosity: Verbosity,
}

impl Display {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Show an informational message
    pub fn info(&self, message: &str) {
        if self.verbosity.show_progress() {
            println!("{}", message);
        }
    }

    /// Show a success message
    pub fn success(&self, message: &str) {
        if self.verbosity.show_progress() {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Show a warning message
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.yellow());
    }

    /// Show an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    /// Shown with -v
    pub fn detail(&self, message: &str) {
        if self.verbosity.show_details() {
            println!("  {}", message.dimmed());
        }
    }

    /// Shown with -vv
    pub fn trace(&self, message: &str) {
        if self.verbosity.show_trace() {
            println!("  {}", message.dimmed());
        }
    }

    /// Note a file that was written
    pub fn wrote(&self, path: &Path) {
        self.trace(&format!("wrote {}", path.display()));
    }

    /// Per-column convergence result lines for one log
    pub fn show_report(&self, name: &str, report: &ConvergenceReport) {
        if !self.verbosity.show_progress() {
            return;
        }

        println!("{}", name.bold().cyan());
        for column in &report.columns {
            match column.outcome {
                ConvergenceOutcome::Converged { time, .. } => {
                    println!("  {} {} converged at {} hrs", "✓".green(), column.column, time);
                }
                ConvergenceOutcome::DoesNotConverge => {
                    println!("  {} {} did not converge", "✗".red(), column.column);
                }
            }
            if let Some(range) = &column.trailing_range {
                self.detail(&format!(
                    "{} trailing window: {} to {}",
                    column.column, range.min, range.max
                ));
            }
        }

        if let Some(volume) = &report.final_volume {
            self.detail(&format!("final volume {}", volume));
        }
    }

    /// Progress bar over `len` runs; hidden in quiet mode
    pub fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.verbosity.show_progress() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} Reviewing [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
