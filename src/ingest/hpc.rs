//! Reader for TUFLOW HPC timestep logs (`.hpc.tlf`)
//!
//! The log is whitespace-delimited. Its first row containing `iStep` is the
//! header; later copies of the header, memory notices and repeated-step
//! notices are noise. Solver diagnostics are dropped, the `H:MM:SS` clock
//! becomes fractional hours, and volume columns are kept as abbreviated
//! text for the analyzer to decode.

use crate::errors::{ReviewError, Result};
use crate::series::{ColumnCategory, Samples, TimeSeries};
use std::fs;
use std::path::Path;

/// Token that marks the header row
pub const HEADER_MARKER: &str = "iStep";

/// Name of the clock column
pub const TIME_COLUMN: &str = "time";

/// Solver diagnostic columns that are never analyzed
pub const DROPPED_COLUMNS: [&str; 5] = ["iStep", "maxNu", "maxNc", "maxNd", "dt"];

const NOISE_CONTAINS: &str = "Memory released";
const NOISE_PREFIX: &str = "Repeating step";

/// Read and parse an HPC log file
pub fn read_hpc_log(path: impl AsRef<Path>) -> Result<TimeSeries> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_hpc_log(&text)
}

/// Parse HPC log text into a time series
pub fn parse_hpc_log(text: &str) -> Result<TimeSeries> {
    let mut lines = text.lines().enumerate();

    let header: Vec<&str> = loop {
        match lines.next() {
            Some((_, line)) if is_header(line) => break line.split_whitespace().collect(),
            Some(_) => continue,
            None => {
                return Err(ReviewError::LogParse {
                    line: 0,
                    reason: format!("no header row containing '{}'", HEADER_MARKER),
                })
            }
        }
    };

    let time_idx = header
        .iter()
        .position(|name| *name == TIME_COLUMN)
        .ok_or_else(|| ReviewError::LogParse {
            line: 0,
            reason: format!("header has no '{}' column", TIME_COLUMN),
        })?;

    let kept: Vec<(usize, &str)> = header
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != time_idx && !DROPPED_COLUMNS.contains(*name))
        .map(|(i, name)| (i, *name))
        .collect();

    let mut rows: Vec<Row> = Vec::new();

    for (idx, line) in lines {
        if is_noise(line) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != header.len() {
            continue;
        }

        let line_no = idx + 1;
        let time = parse_clock(fields[time_idx]).map_err(|reason| ReviewError::LogParse {
            line: line_no,
            reason,
        })?;

        let mut values = Vec::with_capacity(kept.len());
        for (col, name) in &kept {
            let raw = fields[*col];
            let value = if ColumnCategory::classify(name) == ColumnCategory::Volume {
                Cell::Text(raw.to_string())
            } else {
                let number = raw.parse::<f64>().map_err(|_| ReviewError::LogParse {
                    line: line_no,
                    reason: format!("'{}' is not a number in column '{}'", raw, name),
                })?;
                Cell::Number(number)
            };
            values.push(value);
        }

        // a repeated step supersedes everything it re-covers
        while rows.last().is_some_and(|r| r.time >= time) {
            rows.pop();
        }
        rows.push(Row { time, values });
    }

    build_series(&kept, rows)
}

/// Convert `H:MM:SS[.s]` to fractional hours
pub fn parse_clock(text: &str) -> std::result::Result<f64, String> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("'{}' is not an H:MM:SS time", text));
    }
    let bad = || format!("'{}' is not an H:MM:SS time", text);
    let h: u64 = parts[0].parse().map_err(|_| bad())?;
    let m: f64 = parts[1].parse().map_err(|_| bad())?;
    let s: f64 = parts[2].parse().map_err(|_| bad())?;
    Ok(h as f64 + m / 60.0 + s / 3600.0)
}

fn is_header(line: &str) -> bool {
    line.split_whitespace().any(|t| t == HEADER_MARKER)
}

fn is_noise(line: &str) -> bool {
    line.trim().is_empty()
        || is_header(line)
        || line.contains(NOISE_CONTAINS)
        || line.starts_with(NOISE_PREFIX)
}

enum Cell {
    Number(f64),
    Text(String),
}

struct Row {
    time: f64,
    values: Vec<Cell>,
}

fn build_series(kept: &[(usize, &str)], rows: Vec<Row>) -> Result<TimeSeries> {
    let time: Vec<f64> = rows.iter().map(|r| r.time).collect();
    let mut series = TimeSeries::new(time)?;

    let mut numeric: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); kept.len()];
    let mut text: Vec<Vec<String>> = vec![Vec::new(); kept.len()];
    for row in rows {
        for (c, cell) in row.values.into_iter().enumerate() {
            match cell {
                Cell::Number(v) => numeric[c].push(v),
                Cell::Text(s) => text[c].push(s),
            }
        }
    }

    for (c, (_, name)) in kept.iter().enumerate() {
        let samples = if ColumnCategory::classify(name) == ColumnCategory::Volume {
            Samples::Abbreviated(std::mem::take(&mut text[c]))
        } else {
            Samples::Numeric(std::mem::take(&mut numeric[c]))
        };
        series.add_column(*name, samples)?;
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
TUFLOW HPC  Build 2020-10-AB
Simulation start
   iStep       time        dt   maxNu   maxNc   maxNd     nWet       vol
       1    0:00:00    10.000    0.00   0.000   0.000        0         0
       2    0:00:10    10.000    0.10   0.200   0.000       15      1234
Memory released for GPU 0
   iStep       time        dt   maxNu   maxNc   maxNd     nWet       vol
       3    0:00:20    10.000    0.10   0.200   0.000       30    12345'
Repeating step at 0:00:20 with reduced timestep
       3    0:00:20     5.000    0.10   0.200   0.000       28    12344'
       4    0:00:30     5.000    0.10   0.200   0.000       40    12500'
Simulation finished
";

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("1:30:00").unwrap(), 1.5);
        assert!((parse_clock("0:00:36.0").unwrap() - 0.01).abs() < 1e-12);
        assert!((parse_clock("12:00:18").unwrap() - 12.005).abs() < 1e-12);
        assert!(parse_clock("1:30").is_err());
        assert!(parse_clock("a:00:00").is_err());
    }

    #[test]
    fn test_parse_log_skips_noise_and_drops_diagnostics() {
        let series = parse_hpc_log(LOG).unwrap();
        assert_eq!(series.len(), 4);

        let names: Vec<&str> = series.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["nWet", "vol"]);

        match &series.column("nWet").unwrap().samples {
            Samples::Numeric(v) => assert_eq!(v, &vec![0.0, 15.0, 28.0, 40.0]),
            other => panic!("unexpected samples {:?}", other),
        }
        match &series.column("vol").unwrap().samples {
            Samples::Abbreviated(v) => assert_eq!(v[2], "12344'"),
            other => panic!("unexpected samples {:?}", other),
        }
    }

    #[test]
    fn test_repeated_step_keeps_time_ascending() {
        let series = parse_hpc_log(LOG).unwrap();
        let time = series.time();
        assert!(time.windows(2).all(|p| p[1] > p[0]));
        assert!((time[3] - 30.0 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_header() {
        let result = parse_hpc_log("no header here\n1 2 3\n");
        assert!(matches!(result, Err(ReviewError::LogParse { .. })));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = "iStep time dt nWet vol\n1 0:00:00 1.0 x 0\n";
        match parse_hpc_log(text) {
            Err(ReviewError::LogParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
