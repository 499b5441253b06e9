//! Convergence analysis of monitored simulation quantities
//! Slope test for wetted-cell counts, tolerance test for volumes

pub mod convergence;
pub mod regression;
pub mod types;

pub use convergence::{ConvergenceAnalyzer, ConvergenceConfig};
pub use types::{ColumnConvergence, ConvergenceOutcome, ConvergenceReport, VolumeRange, DNC};
