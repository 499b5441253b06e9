//! Analysis system type definitions

use crate::errors::Result;
use crate::series::{ColumnCategory, VolumeValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tabular marker for a quantity that never converged
pub const DNC: &str = "DNC";

/// Outcome of one column's convergence scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceOutcome {
    /// First sample at which the trailing window passed the test
    Converged { time: f64, index: usize },

    /// No sample passed the test
    DoesNotConverge,
}

impl ConvergenceOutcome {
    /// Check if converged
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceOutcome::Converged { .. })
    }

    /// Convergence time in hours, if any
    pub fn time(&self) -> Option<f64> {
        match self {
            ConvergenceOutcome::Converged { time, .. } => Some(*time),
            ConvergenceOutcome::DoesNotConverge => None,
        }
    }

    /// Convergence sample index, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            ConvergenceOutcome::Converged { index, .. } => Some(*index),
            ConvergenceOutcome::DoesNotConverge => None,
        }
    }
}

impl fmt::Display for ConvergenceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceOutcome::Converged { time, .. } => write!(f, "{}", time),
            ConvergenceOutcome::DoesNotConverge => f.write_str(DNC),
        }
    }
}

/// Range of the last full window of a volume column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub min: VolumeValue,
    pub max: VolumeValue,
}

/// Result for one monitored column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConvergence {
    pub column: String,
    pub category: ColumnCategory,
    pub outcome: ConvergenceOutcome,

    /// Volume columns only
    pub trailing_range: Option<VolumeRange>,
}

/// Convergence result for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Tested columns in series order
    pub columns: Vec<ColumnConvergence>,

    /// Last sample of the primary volume column
    pub final_volume: Option<VolumeValue>,

    /// Window size the report was computed with
    pub window_size: usize,

    /// Slope threshold the count columns were held to
    pub slope_threshold: f64,
}

impl ConvergenceReport {
    /// Look up one column's result
    pub fn column(&self, name: &str) -> Option<&ColumnConvergence> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Outcome for one column
    pub fn outcome(&self, name: &str) -> Option<ConvergenceOutcome> {
        self.column(name).map(|c| c.outcome)
    }

    /// Check if every tested column converged
    pub fn all_converged(&self) -> bool {
        self.columns.iter().all(|c| c.outcome.is_converged())
    }

    /// `final vol` cell text, e.g. `(1234')`
    pub fn final_volume_cell(&self) -> String {
        match &self.final_volume {
            Some(v) => format!("({})", v),
            None => String::new(),
        }
    }

    /// Header and single row for tabular output
    pub fn to_row(&self) -> (Vec<String>, Vec<String>) {
        let mut header: Vec<String> = self.columns.iter().map(|c| c.column.clone()).collect();
        let mut row: Vec<String> = self.columns.iter().map(|c| c.outcome.to_string()).collect();
        header.push("final vol".to_string());
        row.push(self.final_volume_cell());
        (header, row)
    }

    /// Pretty JSON rendering for `check --json`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
