//! CLI module for tuflow-review
//!
//! Handles command-line argument parsing and configuration management.

pub mod config;
pub mod args;

pub use config::{Config, OutputConfig, ReviewConfig};
pub use args::{Args, Commands, ConvergenceArgs, Verbosity};
