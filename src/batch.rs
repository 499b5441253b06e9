//! Per-run review pipeline
//!
//! `check_log` covers one HPC log; `review_run` pairs it with the run log of
//! the same name. `discover_runs` finds every run under a log directory.

use crate::analysis::{ConvergenceAnalyzer, ConvergenceConfig, ConvergenceReport};
use crate::cli::Config;
use crate::errors::{ReviewError, Result};
use crate::ingest::{read_hpc_log, read_tlf, RunSummary};
use crate::output::{
    is_hpc_log, is_run_log, log_review_path, plot_series, review::merge_rows, run_stem,
    summary_path, write_run_summary_csv, write_summary_csv,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every run of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOptions {
    pub convergence: ConvergenceConfig,
    pub write_plots: bool,
    pub plot_width: f64,
    pub plot_height: f64,
    pub modeler: String,
}

impl ReviewOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            convergence: config.convergence.clone(),
            write_plots: config.output.write_plots,
            plot_width: config.output.plot_width,
            plot_height: config.output.plot_height,
            modeler: config.review.modeler.clone().unwrap_or_default(),
        }
    }
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of checking one HPC log
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: ConvergenceReport,
    pub summary_csv: PathBuf,
    pub plots: Vec<PathBuf>,
}

/// Analyze one `.hpc.tlf` and write its summary table (and plots)
pub fn check_log(hpc_log: &Path, options: &ReviewOptions) -> Result<CheckOutcome> {
    let analyzer = ConvergenceAnalyzer::with_config(options.convergence.clone())?;
    let series = read_hpc_log(hpc_log)?;
    let report = analyzer.analyze(&series)?;

    let summary_csv = summary_path(hpc_log);
    write_summary_csv(&report, &summary_csv)?;

    let plots = if options.write_plots {
        plot_series(&series, hpc_log, options.plot_width, options.plot_height)?
    } else {
        Vec::new()
    };

    Ok(CheckOutcome {
        report,
        summary_csv,
        plots,
    })
}

/// The logs found for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLogs {
    pub run: String,
    pub run_log: Option<PathBuf>,
    pub hpc_log: Option<PathBuf>,
}

/// Find every run under `dir`, recursively, in path order
///
/// Logs pair up when they share a directory and a run name.
pub fn discover_runs(dir: &Path) -> Result<Vec<RunLogs>> {
    let mut runs: BTreeMap<PathBuf, RunLogs> = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }

            let hpc = is_hpc_log(&path);
            if !hpc && !is_run_log(&path) {
                continue;
            }

            let run = run_stem(&path);
            let logs = runs.entry(current.join(&run)).or_insert_with(|| RunLogs {
                run,
                ..RunLogs::default()
            });
            if hpc {
                logs.hpc_log = Some(path);
            } else {
                logs.run_log = Some(path);
            }
        }
    }

    Ok(runs.into_values().collect())
}

/// Both reviews of one run
#[derive(Debug, Clone)]
pub struct RunReview {
    pub run: String,
    pub summary: RunSummary,
    pub log_review_csv: PathBuf,
    pub check: CheckOutcome,
}

impl RunReview {
    /// `run`, then the run log fields, then the convergence fields
    pub fn merged_row(&self) -> (Vec<String>, Vec<String>) {
        merge_rows(&[
            (vec!["run".to_string()], vec![self.run.clone()]),
            self.summary.to_row(),
            self.check.report.to_row(),
        ])
    }
}

/// Summarize the run log and check the HPC log of one run
pub fn review_run(logs: &RunLogs, options: &ReviewOptions) -> Result<RunReview> {
    let (Some(run_log), Some(hpc_log)) = (&logs.run_log, &logs.hpc_log) else {
        let missing = if logs.run_log.is_none() { ".tlf" } else { ".hpc.tlf" };
        return Err(ReviewError::Generic(format!(
            "{}: no {} log found",
            logs.run, missing
        )));
    };

    let summary = read_tlf(run_log, &options.modeler)?;
    let check = check_log(hpc_log, options)?;

    let log_review_csv = log_review_path(run_log);
    write_run_summary_csv(&summary, &log_review_csv)?;

    Ok(RunReview {
        run: logs.run.clone(),
        summary,
        log_review_csv,
        check,
    })
}

/// `<dir>/<dir name>_review_summary.csv`
pub fn default_review_path(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logs".to_string());
    dir.join(format!("{}_review_summary.csv", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_pairs_logs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        for file in ["Q100.tlf", "Q100.hpc.tlf", "Q200.hpc.tlf", "notes.txt", "sub/Q100.tlf"] {
            fs::write(root.join(file), "").unwrap();
        }

        let runs = discover_runs(root).unwrap();
        assert_eq!(runs.len(), 3);

        assert_eq!(runs[0].run, "Q100");
        assert!(runs[0].run_log.is_some() && runs[0].hpc_log.is_some());
        assert_eq!(runs[1].run, "Q200");
        assert!(runs[1].run_log.is_none());
        assert_eq!(runs[2].hpc_log, None);
        assert!(runs[2].run_log.as_ref().unwrap().starts_with(root.join("sub")));
    }

    #[test]
    fn test_review_run_requires_both_logs() {
        let logs = RunLogs {
            run: "Q200".to_string(),
            run_log: None,
            hpc_log: Some(PathBuf::from("Q200.hpc.tlf")),
        };
        let err = review_run(&logs, &ReviewOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no .tlf log"));
    }

    #[test]
    fn test_failed_check_leaves_no_log_review() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Q300.tlf"), "Input File: C:\\runs\\Q300.tcf\n").unwrap();
        fs::write(root.join("Q300.hpc.tlf"), "TUFLOW HPC\n").unwrap();

        let logs = RunLogs {
            run: "Q300".to_string(),
            run_log: Some(root.join("Q300.tlf")),
            hpc_log: Some(root.join("Q300.hpc.tlf")),
        };
        assert!(review_run(&logs, &ReviewOptions::default()).is_err());
        assert!(!root.join("Q300_log_review.csv").exists());
    }

    #[test]
    fn test_default_review_path() {
        let path = default_review_path(Path::new("/data/LYR_182"));
        assert_eq!(path, PathBuf::from("/data/LYR_182/LYR_182_review_summary.csv"));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.review.modeler = Some("AB".to_string());
        config.output.write_plots = false;

        let options = ReviewOptions::from_config(&config);
        assert_eq!(options.modeler, "AB");
        assert!(!options.write_plots);
        assert_eq!(options.convergence.window_size, 500);
    }
}
