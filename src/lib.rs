//! tuflow_review - Convergence review of TUFLOW HPC simulation logs
//!
//! Reads the per-timestep HPC log of a 2D hydraulic simulation, decides when
//! the wetted-cell counts and the domain volume stopped changing, and writes
//! the results next to the log for the modeling log.
//!
//! # Architecture
//!
//! - **series**: time series model and the abbreviated volume codec
//! - **analysis**: sliding-window convergence tests
//! - **ingest**: `.hpc.tlf` and `.tlf` log readers
//! - **output**: summary tables, plots and the merged review log
//! - **batch**: per-run pipeline shared by the CLI commands

pub mod errors;
pub mod series;
pub mod analysis;
pub mod ingest;
pub mod output;
pub mod batch;

// Re-export commonly used types
pub use errors::{ReviewError, Result};
pub use analysis::{ConvergenceAnalyzer, ConvergenceConfig, ConvergenceOutcome, ConvergenceReport};
pub use series::{TimeSeries, VolumeValue};

// Interface layer
pub mod cli;
pub mod display;
pub mod telemetry;
