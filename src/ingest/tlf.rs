//! Run-level TUFLOW log (`.tlf`) summary for the modeling log
//!
//! Scans the log for a fixed set of marker strings and pulls one value out
//! of each matching line. A marker that never appears leaves its field
//! empty; a marker that appears more than once keeps the last match.

use crate::errors::{ReviewError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Field label for the modeler initials
pub const MODELER_FIELD: &str = "modeler";

/// Field label for the roughness source
pub const MANNINGS_FIELD: &str = "Manning's n";

const STARTED_FIELD: &str = "Simulation Started";
const STARTED_INPUT_FORMAT: &str = "%Y-%b-%d %H:%M";
const STARTED_OUTPUT_FORMAT: &str = "%m/%d/%Y";

const MANNINGS_MARKERS: [&str; 2] = ["Read GRID CnM ==", "Fixed Manning's n = "];

#[derive(Debug, Clone, Copy)]
enum Extract {
    /// Text after the last backslash (a file name)
    FileName,
    /// Text after the marker
    AfterMarker,
    /// Whole hours of the value after the marker
    WholeHours,
    /// Hours inside `[... h]`
    BracketHours,
    /// Event file name, cut at the `...` progress dots
    EventFile,
    /// Value after the marker, cut at the `  !` comment
    BeforeBang,
    /// Count after the marker, cut at the `  [` detail
    Count,
    /// Volume error pair
    VolumeError,
    /// Value after the marker with spaces removed
    Compact,
}

struct Probe {
    marker: &'static str,
    label: &'static str,
    extract: Extract,
}

const PROBES: [Probe; 20] = [
    Probe {
        marker: "BC Database == ",
        label: "BC Database",
        extract: Extract::FileName,
    },
    Probe {
        marker: "Simulation Started: ",
        label: STARTED_FIELD,
        extract: Extract::AfterMarker,
    },
    Probe {
        marker: "End Time (h): ",
        label: "End Time (h)",
        extract: Extract::WholeHours,
    },
    Probe {
        marker: "CPU Time: ",
        label: "CPU Time",
        extract: Extract::BracketHours,
    },
    Probe {
        marker: "Clock Time: ",
        label: "Clock Time",
        extract: Extract::BracketHours,
    },
    Probe {
        marker: "Input File: ",
        label: "Input File",
        extract: Extract::FileName,
    },
    Probe {
        marker: ".tef",
        label: ".tef",
        extract: Extract::EventFile,
    },
    Probe {
        marker: "   Geometry Control File == ",
        label: "Geometry Control File",
        extract: Extract::FileName,
    },
    Probe {
        marker: "   BC Control File == ",
        label: "BC Control File",
        extract: Extract::FileName,
    },
    Probe {
        marker: "BC Event Source == __event__ | ",
        label: "BC Event Source",
        extract: Extract::AfterMarker,
    },
    Probe {
        marker: "tgc>> Read Grid IWL == ",
        label: "Read Grid IWL",
        extract: Extract::FileName,
    },
    Probe {
        marker: "HPC HCN Repeated Timesteps: ",
        label: "HPC HCN Repeated Timesteps",
        extract: Extract::BeforeBang,
    },
    Probe {
        marker: "HPC NaN Repeated Timesteps: ",
        label: "HPC NaN Repeated Timesteps",
        extract: Extract::BeforeBang,
    },
    Probe {
        marker: "HPC NaN WARNING 2550: ",
        label: "HPC NaN WARNING 2550",
        extract: Extract::AfterMarker,
    },
    Probe {
        marker: "WARNINGs prior to simulation: ",
        label: "WARNINGs prior to simulation",
        extract: Extract::Count,
    },
    Probe {
        marker: "WARNINGs during simulation: ",
        label: "WARNINGs during simulation",
        extract: Extract::Count,
    },
    Probe {
        marker: "CHECKs prior to simulation: ",
        label: "CHECKs prior to simulation",
        extract: Extract::Count,
    },
    Probe {
        marker: "CHECKs during simulation: ",
        label: "CHECKs during simulation",
        extract: Extract::Count,
    },
    Probe {
        marker: "Volume Error (ft3):     ",
        label: "Volume Error (ft3)",
        extract: Extract::VolumeError,
    },
    Probe {
        marker: "Final Cumulative ME:",
        label: "Final Cumulative ME",
        extract: Extract::Compact,
    },
];

/// One row of the modeling log, fields in output order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub fields: Vec<(String, String)>,
}

impl RunSummary {
    /// Value of one field
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Header and single row for tabular output
    pub fn to_row(&self) -> (Vec<String>, Vec<String>) {
        self.fields.iter().cloned().unzip()
    }
}

/// Read and summarize a run log file
pub fn read_tlf(path: impl AsRef<Path>, modeler: &str) -> Result<RunSummary> {
    let text = fs::read_to_string(path.as_ref())?;
    summarize_tlf(&text, modeler)
}

/// Summarize run log text
pub fn summarize_tlf(text: &str, modeler: &str) -> Result<RunSummary> {
    let mut values: Vec<Option<(usize, String)>> = vec![None; PROBES.len()];
    let mut mannings: Vec<String> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        for (p, probe) in PROBES.iter().enumerate() {
            if line.contains(probe.marker) {
                values[p] = Some((idx + 1, extract(line, probe)));
            }
        }
        for marker in MANNINGS_MARKERS {
            if let Some((_, rest)) = line.split_once(marker) {
                mannings.push(rest.trim().to_string());
            }
        }
    }

    let mut fields: Vec<(String, String)> = Vec::with_capacity(PROBES.len() + 2);
    for (probe, value) in PROBES.iter().zip(values) {
        let text = match value {
            Some((line, raw)) if probe.label == STARTED_FIELD => reformat_started(&raw, line)?,
            Some((_, raw)) => raw,
            None => String::new(),
        };
        fields.push((probe.label.to_string(), text));
    }

    fields.insert(2, (MODELER_FIELD.to_string(), modeler.to_string()));
    fields.insert(12, (MANNINGS_FIELD.to_string(), mannings.join(", ")));

    Ok(RunSummary { fields })
}

fn extract(line: &str, probe: &Probe) -> String {
    let line = line.trim_end_matches(['\r', '\n']);
    let after = line
        .split_once(probe.marker)
        .map(|(_, rest)| rest)
        .unwrap_or("");

    let value = match probe.extract {
        Extract::FileName => line.rsplit('\\').next().unwrap_or("").to_string(),
        Extract::AfterMarker => after.to_string(),
        Extract::WholeHours => after.split('.').next().unwrap_or("").replace(' ', ""),
        Extract::BracketHours => line
            .split_once('[')
            .map(|(_, rest)| rest.replace(" h]", ""))
            .unwrap_or_default(),
        Extract::EventFile => {
            let name = line.rsplit('\\').next().unwrap_or("");
            name.split("...").next().unwrap_or("").to_string()
        }
        Extract::BeforeBang => after.split("  !").next().unwrap_or("").to_string(),
        Extract::Count => after.split("  [").next().unwrap_or("").replace(' ', ""),
        Extract::VolumeError => after
            .split(" of Volume")
            .next()
            .unwrap_or("")
            .replace(" or", ","),
        Extract::Compact => after.replace(' ', ""),
    };
    value.trim().to_string()
}

fn reformat_started(raw: &str, line: usize) -> Result<String> {
    let started = NaiveDateTime::parse_from_str(raw.trim(), STARTED_INPUT_FORMAT).map_err(|e| {
        ReviewError::LogParse {
            line,
            reason: format!("simulation start '{}' is not a date: {}", raw, e),
        }
    })?;
    Ok(started.format(STARTED_OUTPUT_FORMAT).to_string())
}
