//! Command-line argument parsing for tuflow-review
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::analysis::ConvergenceConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tuflow-review - Convergence review of TUFLOW HPC simulation logs
#[derive(Parser, Debug)]
#[command(name = "tuflow-review")]
#[command(version)]
#[command(
    about = "Check TUFLOW HPC logs for wetted-cell and volume convergence",
    long_about = None
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the convergence check on one HPC log (.hpc.tlf)
    Check {
        /// HPC timestep log
        #[arg(value_name = "HPC_TLF")]
        log: PathBuf,

        #[command(flatten)]
        convergence: ConvergenceArgs,

        /// Skip the per-column plots
        #[arg(long)]
        no_plots: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize one run log (.tlf) for the modeling log
    Summarize {
        /// Run log
        #[arg(value_name = "TLF")]
        log: PathBuf,

        /// Initials of the modeler who ran the model
        #[arg(long)]
        modeler: Option<String>,
    },

    /// Review every run in a log directory and merge the results
    Review {
        /// Directory searched recursively for .tlf and .hpc.tlf logs
        #[arg(value_name = "LOG_DIR")]
        dir: PathBuf,

        /// Merged table (default: <LOG_DIR>/<dir name>_review_summary.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        convergence: ConvergenceArgs,

        /// Initials of the modeler who ran the models
        #[arg(long)]
        modeler: Option<String>,

        /// Skip the per-column plots
        #[arg(long)]
        no_plots: bool,
    },

    /// Display current configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Command-line overrides of the convergence settings
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ConvergenceArgs {
    /// Trailing samples checked before each candidate sample
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Largest accepted |slope| for wetted-cell counts (cells per hour)
    #[arg(long)]
    pub slope_threshold: Option<f64>,

    /// Largest accepted volume deviation (raw units)
    #[arg(long)]
    pub volume_tolerance: Option<u64>,
}

impl ConvergenceArgs {
    /// Overlay the flags that were given
    pub fn apply(&self, config: &mut ConvergenceConfig) {
        if let Some(w) = self.window_size {
            config.window_size = w;
        }
        if let Some(s) = self.slope_threshold {
            config.slope_threshold = s;
        }
        if let Some(t) = self.volume_tolerance {
            config.volume_tolerance = t;
        }
    }
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress and results
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show per-column details
    pub fn show_details(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Check if should show every extracted field and written file
    pub fn show_trace(&self) -> bool {
        matches!(self, Verbosity::VeryVerbose)
    }
}
