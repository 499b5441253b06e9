//! Simulation log ingestion
//!
//! `hpc` turns the per-timestep `.hpc.tlf` log into a `TimeSeries`;
//! `tlf` scrapes the run-level `.tlf` log into a modeling-log row.

pub mod hpc;
pub mod tlf;

pub use hpc::{parse_hpc_log, read_hpc_log};
pub use tlf::{read_tlf, summarize_tlf, RunSummary};
