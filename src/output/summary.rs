//! Single-row CSV tables

use crate::analysis::ConvergenceReport;
use crate::errors::Result;
use crate::ingest::RunSummary;
use std::path::Path;

/// Write a header and one row, replacing any existing file
pub fn write_row_csv(path: &Path, header: &[String], row: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

/// Convergence times per column plus `final vol`
pub fn write_summary_csv(report: &ConvergenceReport, path: &Path) -> Result<()> {
    let (header, row) = report.to_row();
    write_row_csv(path, &header, &row)
}

/// Modeling-log row scraped from a run log
pub fn write_run_summary_csv(summary: &RunSummary, path: &Path) -> Result<()> {
    let (header, row) = summary.to_row();
    write_row_csv(path, &header, &row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ColumnConvergence, ConvergenceOutcome};
    use crate::series::{ColumnCategory, VolumeValue};
    use tempfile::TempDir;

    #[test]
    fn test_write_summary_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run_hpc_summary.csv");

        let report = ConvergenceReport {
            columns: vec![
                ColumnConvergence {
                    column: "nWet".to_string(),
                    category: ColumnCategory::Count,
                    outcome: ConvergenceOutcome::Converged { time: 6.25, index: 750 },
                    trailing_range: None,
                },
                ColumnConvergence {
                    column: "vol".to_string(),
                    category: ColumnCategory::Volume,
                    outcome: ConvergenceOutcome::DoesNotConverge,
                    trailing_range: None,
                },
            ],
            final_volume: Some(VolumeValue::encode(98_765_432_100)),
            window_size: 500,
            slope_threshold: 0.01,
        };

        write_summary_csv(&report, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "nWet,vol,final vol\n6.25,DNC,(98765'')\n");
    }

    #[test]
    fn test_quoting_of_commas() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("row.csv");
        let header = vec!["a".to_string(), "b".to_string()];
        let row = vec!["x, y".to_string(), "z".to_string()];

        write_row_csv(&path, &header, &row).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a,b\n\"x, y\",z\n");
    }
}
