//! Time series type definitions

use crate::errors::{ReviewError, Result};
use serde::{Deserialize, Serialize};

/// Column name prefix for wetted-cell counts
pub const COUNT_PREFIX: &str = "nWet";

/// Column name prefix for volumes
pub const VOLUME_PREFIX: &str = "vol";

/// Convergence regime of a monitored column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnCategory {
    /// Wetted-cell counts, checked with the regression slope test
    Count,

    /// Volumes in abbreviated-magnitude form, checked with the tolerance test
    Volume,

    /// Anything else; plotted but never tested
    Other,
}

impl ColumnCategory {
    /// Classify a column by its name prefix
    pub fn classify(name: &str) -> Self {
        if name.starts_with(COUNT_PREFIX) {
            ColumnCategory::Count
        } else if name.starts_with(VOLUME_PREFIX) {
            ColumnCategory::Volume
        } else {
            ColumnCategory::Other
        }
    }

    /// Y-axis label used for plots of this category
    pub fn axis_label(&self) -> &'static str {
        match self {
            ColumnCategory::Count => "Number of Wetted Cells",
            _ => "Volume (cu.ft.)",
        }
    }
}

/// Samples of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Samples {
    /// Plain numeric samples
    Numeric(Vec<f64>),

    /// Abbreviated-magnitude text, decoded at analysis time
    Abbreviated(Vec<String>),
}

impl Samples {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            Samples::Numeric(v) => v.len(),
            Samples::Abbreviated(v) => v.len(),
        }
    }

    /// Check if there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, classified column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub category: ColumnCategory,
    pub samples: Samples,
}

/// Monitored quantities sampled against simulation time (hours)
///
/// Every column has exactly one sample per time entry, and time is strictly
/// ascending. Both are checked when a column is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    time: Vec<f64>,
    columns: Vec<Column>,
}

impl TimeSeries {
    /// Create a series from its time column
    pub fn new(time: Vec<f64>) -> Result<Self> {
        if let Some(index) = time
            .windows(2)
            .position(|pair| !(pair[1] > pair[0]))
        {
            return Err(ReviewError::UnorderedTime { index: index + 1 });
        }

        Ok(Self {
            time,
            columns: Vec::new(),
        })
    }

    /// Add a column, classifying it by name
    ///
    /// Count columns must be numeric. Volume columns may be either
    /// abbreviated text or raw numbers.
    pub fn add_column(&mut self, name: impl Into<String>, samples: Samples) -> Result<()> {
        let name = name.into();
        if samples.len() != self.time.len() {
            return Err(ReviewError::MisalignedSeries {
                column: name,
                expected: self.time.len(),
                actual: samples.len(),
            });
        }

        let category = ColumnCategory::classify(&name);
        if category != ColumnCategory::Volume && matches!(samples, Samples::Abbreviated(_)) {
            return Err(ReviewError::ColumnKind {
                column: name,
                expected: "numeric".to_string(),
            });
        }

        self.columns.push(Column {
            name,
            category,
            samples,
        });
        Ok(())
    }

    /// Builder-style variant of [`TimeSeries::add_column`]
    pub fn with_column(mut self, name: impl Into<String>, samples: Samples) -> Result<Self> {
        self.add_column(name, samples)?;
        Ok(self)
    }

    /// Simulation times in hours
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of samples per column
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Check if the series has no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// All columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
