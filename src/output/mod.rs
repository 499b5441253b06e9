//! Review outputs: summary tables, plots and the merged review log
//!
//! Output files sit next to the log they came from and are named after it:
//! `<run>.hpc.tlf` gives `<run>_hpc_summary.csv` and `<run>_<column>.svg`,
//! `<run>.tlf` gives `<run>_log_review.csv`.

pub mod plot;
pub mod review;
pub mod summary;

pub use plot::{plot_series, LineGraph};
pub use review::ReviewLog;
pub use summary::{write_row_csv, write_run_summary_csv, write_summary_csv};

use std::path::{Path, PathBuf};

/// HPC log suffix
pub const HPC_LOG_SUFFIX: &str = ".hpc.tlf";

/// Run log suffix
pub const RUN_LOG_SUFFIX: &str = ".tlf";

/// Run name of a log file (`dir/Q5000.hpc.tlf` -> `Q5000`)
pub fn run_stem(log: &Path) -> String {
    let name = log
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(HPC_LOG_SUFFIX)
        .or_else(|| name.strip_suffix(RUN_LOG_SUFFIX))
        .unwrap_or(&name)
        .to_string()
}

/// Check if a path names an HPC log
pub fn is_hpc_log(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(HPC_LOG_SUFFIX))
        .unwrap_or(false)
}

/// Check if a path names a run log (and not an HPC log)
pub fn is_run_log(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(RUN_LOG_SUFFIX))
        .unwrap_or(false)
        && !is_hpc_log(path)
}

fn sibling(log: &Path, suffix: &str) -> PathBuf {
    let file = format!("{}{}", run_stem(log), suffix);
    match log.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

/// `<run>_hpc_summary.csv`
pub fn summary_path(hpc_log: &Path) -> PathBuf {
    sibling(hpc_log, "_hpc_summary.csv")
}

/// `<run>_<column>.svg`
pub fn plot_path(hpc_log: &Path, column: &str) -> PathBuf {
    sibling(hpc_log, &format!("_{}.svg", column))
}

/// `<run>_log_review.csv`
pub fn log_review_path(run_log: &Path) -> PathBuf {
    sibling(run_log, "_log_review.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stem() {
        assert_eq!(run_stem(Path::new("logs/LYR_182_Q5000.hpc.tlf")), "LYR_182_Q5000");
        assert_eq!(run_stem(Path::new("LYR_182_Q5000.tlf")), "LYR_182_Q5000");
        assert_eq!(run_stem(Path::new("notes.txt")), "notes.txt");
    }

    #[test]
    fn test_log_kinds() {
        assert!(is_hpc_log(Path::new("a/run.hpc.tlf")));
        assert!(!is_run_log(Path::new("a/run.hpc.tlf")));
        assert!(is_run_log(Path::new("a/run.tlf")));
        assert!(!is_hpc_log(Path::new("a/run.tlf")));
    }

    #[test]
    fn test_output_paths() {
        let log = Path::new("logs/Q5000.hpc.tlf");
        assert_eq!(summary_path(log), PathBuf::from("logs/Q5000_hpc_summary.csv"));
        assert_eq!(plot_path(log, "nWet"), PathBuf::from("logs/Q5000_nWet.svg"));
        assert_eq!(
            log_review_path(Path::new("logs/Q5000.tlf")),
            PathBuf::from("logs/Q5000_log_review.csv")
        );
    }
}
