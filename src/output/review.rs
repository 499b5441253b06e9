//! Merged review table for a batch of runs
//!
//! `ReviewLog` is the accumulator for one aggregation run. Rows are kept in
//! memory as they arrive and the table is written once by `finish`, under
//! the union of every header seen. A run that lacks a column gets an empty
//! cell there. A fresh `ReviewLog` always replaces the output file.

use crate::errors::{ReviewError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Accumulating CSV table scoped to one batch
#[derive(Debug)]
pub struct ReviewLog {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl ReviewLog {
    /// Create an accumulator; nothing is written until `finish`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Add one row under its own header
    ///
    /// Columns not seen before are placed after the column that precedes
    /// them in `header`.
    pub fn append(&mut self, header: &[String], row: &[String]) -> Result<()> {
        if header.len() != row.len() {
            return Err(ReviewError::Generic(format!(
                "row has {} fields but header has {}",
                row.len(),
                header.len()
            )));
        }

        let mut cells = HashMap::with_capacity(header.len());
        for (name, value) in header.iter().zip(row) {
            if cells.insert(name.clone(), value.clone()).is_some() {
                return Err(ReviewError::Generic(format!(
                    "column '{}' appears twice in one row",
                    name
                )));
            }
        }

        let mut insert_at = 0;
        for name in header {
            match self.header.iter().position(|h| h == name) {
                Some(pos) => insert_at = pos + 1,
                None => {
                    self.header.insert(insert_at, name.clone());
                    insert_at += 1;
                }
            }
        }

        self.rows.push(cells);
        Ok(())
    }

    /// Combined header in output order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows accumulated so far
    pub fn rows_written(&self) -> usize {
        self.rows.len()
    }

    /// Write the table, replacing any existing file
    ///
    /// Does not touch the file when no row was appended.
    pub fn finish(self) -> Result<PathBuf> {
        if self.rows.is_empty() {
            return Ok(self.path);
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&self.header)?;
        for cells in &self.rows {
            let record = self
                .header
                .iter()
                .map(|name| cells.get(name).map(String::as_str).unwrap_or(""));
            writer.write_record(record)?;
        }
        writer.flush()?;

        Ok(self.path)
    }
}

/// Join several `(header, row)` pairs side by side
pub fn merge_rows(parts: &[(Vec<String>, Vec<String>)]) -> (Vec<String>, Vec<String>) {
    let mut header = Vec::new();
    let mut row = Vec::new();
    for (h, r) in parts {
        header.extend(h.iter().cloned());
        row.extend(r.iter().cloned());
    }
    (header, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_finish_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("182_review_summary.csv");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut log = ReviewLog::new(&path);
        log.append(&strings(&["run", "nWet"]), &strings(&["Q100", "4.5"])).unwrap();
        log.append(&strings(&["run", "nWet"]), &strings(&["Q200", "DNC"])).unwrap();
        assert_eq!(log.rows_written(), 2);

        assert_eq!(log.finish().unwrap(), path);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "run,nWet\nQ100,4.5\nQ200,DNC\n");
    }

    #[test]
    fn test_differing_quantity_columns_are_unioned() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("review.csv");

        let mut log = ReviewLog::new(&path);
        log.append(
            &strings(&["run", "nWet", "vol", "final vol"]),
            &strings(&["Q100", "2.5", "3", "(12')"]),
        )
        .unwrap();
        log.append(
            &strings(&["run", "nWet", "nWetPO_1", "vol", "final vol"]),
            &strings(&["Q200", "DNC", "4", "5", "(13')"]),
        )
        .unwrap();

        assert_eq!(
            log.header(),
            strings(&["run", "nWet", "nWetPO_1", "vol", "final vol"]).as_slice()
        );
        log.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "run,nWet,nWetPO_1,vol,final vol\nQ100,2.5,,3,(12')\nQ200,DNC,4,5,(13')\n"
        );
    }

    #[test]
    fn test_malformed_rows_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut log = ReviewLog::new(temp_dir.path().join("review.csv"));
        log.append(&strings(&["a"]), &strings(&["1"])).unwrap();
        assert!(log.append(&strings(&["a", "b"]), &strings(&["2"])).is_err());
        assert!(log.append(&strings(&["b", "b"]), &strings(&["2", "3"])).is_err());
        assert_eq!(log.rows_written(), 1);
        assert_eq!(log.header(), strings(&["a"]).as_slice());
    }

    #[test]
    fn test_empty_log_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("review.csv");
        ReviewLog::new(&path).finish().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_merge_rows() {
        let (header, row) = merge_rows(&[
            (strings(&["run"]), strings(&["Q100"])),
            (strings(&["nWet", "final vol"]), strings(&["DNC", "(12')"])),
        ]);
        assert_eq!(header, strings(&["run", "nWet", "final vol"]));
        assert_eq!(row, strings(&["Q100", "DNC", "(12')"]));
    }
}
