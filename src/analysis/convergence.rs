//! Convergence detection for simulation time series
//!
//! Count columns converge when the least-squares slope over the trailing
//! window is within `slope_threshold`. Volume columns converge when the
//! current sample is within `volume_tolerance` of every sample in the
//! trailing window. In both cases the first qualifying sample wins and the
//! scan stops there.

use crate::analysis::regression::SlidingRegression;
use crate::analysis::types::{
    ColumnConvergence, ConvergenceOutcome, ConvergenceReport, VolumeRange,
};
use crate::errors::{ReviewError, Result};
use crate::series::{Column, ColumnCategory, Samples, TimeSeries, VolumeValue, VOLUME_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Convergence analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// Number of trailing samples checked before each candidate sample
    pub window_size: usize,

    /// Largest accepted |slope| for count columns, units per hour
    pub slope_threshold: f64,

    /// Largest accepted deviation for volume columns, raw units
    ///
    /// Compared against fully decoded values, so `1234'` counts as
    /// 1 234 000. At the default of 1, volumes of a million or more
    /// only converge when they repeat exactly.
    pub volume_tolerance: u64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            window_size: 500,
            slope_threshold: 0.01,
            volume_tolerance: 1,
        }
    }
}

impl ConvergenceConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(ReviewError::ConfigError(
                "window_size must be at least 2".to_string(),
            ));
        }

        if !self.slope_threshold.is_finite() || self.slope_threshold < 0.0 {
            return Err(ReviewError::ConfigError(format!(
                "slope_threshold must be a non-negative number, got {}",
                self.slope_threshold
            )));
        }

        Ok(())
    }

    /// Minimum series length the analysis accepts
    pub fn required_samples(&self) -> usize {
        self.window_size + 1
    }
}

/// Convergence analyzer
///
/// Stateless apart from its configuration; `analyze` only reads the series.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceAnalyzer {
    config: ConvergenceConfig,
}

impl ConvergenceAnalyzer {
    /// Create analyzer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create analyzer with custom configuration
    pub fn with_config(config: ConvergenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get configuration
    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Analyze every count and volume column of a series
    ///
    /// Fails as a whole with `InsufficientData` when the series has fewer
    /// than `window_size + 1` samples.
    pub fn analyze(&self, series: &TimeSeries) -> Result<ConvergenceReport> {
        let required = self.config.required_samples();
        if series.len() < required {
            return Err(ReviewError::InsufficientData {
                samples: series.len(),
                required,
            });
        }

        let mut columns = Vec::new();
        let mut final_volume = None;

        for column in series.columns() {
            match column.category {
                ColumnCategory::Count => {
                    let values = numeric_samples(column)?;
                    columns.push(ColumnConvergence {
                        column: column.name.clone(),
                        category: column.category,
                        outcome: self.scan_counts(series.time(), values),
                        trailing_range: None,
                    });
                }
                ColumnCategory::Volume => {
                    let raw = decode_volumes(column)?;
                    let (outcome, range) = self.scan_volumes(series.time(), &raw);

                    let is_primary = column.name == VOLUME_PREFIX || final_volume.is_none();
                    if is_primary {
                        final_volume = raw.last().map(|v| VolumeValue::encode(*v));
                    }

                    columns.push(ColumnConvergence {
                        column: column.name.clone(),
                        category: column.category,
                        outcome,
                        trailing_range: Some(range),
                    });
                }
                ColumnCategory::Other => {}
            }
        }

        Ok(ConvergenceReport {
            columns,
            final_volume,
            window_size: self.config.window_size,
            slope_threshold: self.config.slope_threshold,
        })
    }

    /// Slope test over `values[i - w..i]` for each `i >= w`
    pub(crate) fn scan_counts(&self, time: &[f64], values: &[f64]) -> ConvergenceOutcome {
        let w = self.config.window_size;
        let Some(mut window) = SlidingRegression::new(time, values, w) else {
            return ConvergenceOutcome::DoesNotConverge;
        };

        for i in w..time.len() {
            debug_assert_eq!(window.end(), i);
            if let Some(slope) = window.slope() {
                if slope.abs() <= self.config.slope_threshold {
                    return ConvergenceOutcome::Converged { time: time[i], index: i };
                }
            }
            window.advance();
        }

        ConvergenceOutcome::DoesNotConverge
    }

    /// Tolerance test of `raw[i]` against `raw[i - w..i]` for each `i >= w`
    ///
    /// Also returns the range of the last window examined.
    pub(crate) fn scan_volumes(
        &self,
        time: &[f64],
        raw: &[u64],
    ) -> (ConvergenceOutcome, VolumeRange) {
        let w = self.config.window_size;
        let tol = self.config.volume_tolerance;
        let mut window = SlidingExtrema::new();
        for (j, v) in raw.iter().enumerate().take(w) {
            window.push(j, *v);
        }

        let mut outcome = ConvergenceOutcome::DoesNotConverge;
        for i in w..raw.len() {
            let (lo, hi) = window.range();
            if raw[i].abs_diff(lo) <= tol && raw[i].abs_diff(hi) <= tol {
                outcome = ConvergenceOutcome::Converged { time: time[i], index: i };
                break;
            }
            if i + 1 < raw.len() {
                window.push(i, raw[i]);
                window.evict_before(i + 1 - w);
            }
        }

        let (lo, hi) = window.range();
        let range = VolumeRange {
            min: VolumeValue::encode(lo),
            max: VolumeValue::encode(hi),
        };
        (outcome, range)
    }
}

fn numeric_samples(column: &Column) -> Result<&[f64]> {
    match &column.samples {
        Samples::Numeric(values) => Ok(values),
        Samples::Abbreviated(_) => Err(ReviewError::ColumnKind {
            column: column.name.clone(),
            expected: "numeric".to_string(),
        }),
    }
}

fn decode_volumes(column: &Column) -> Result<Vec<u64>> {
    match &column.samples {
        Samples::Abbreviated(text) => text.iter().map(|s| VolumeValue::decode(s)).collect(),
        Samples::Numeric(values) => values
            .iter()
            .map(|v| {
                if v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64 {
                    Ok(*v as u64)
                } else {
                    Err(ReviewError::format(
                        &v.to_string(),
                        "raw volume must be a non-negative whole number",
                    ))
                }
            })
            .collect(),
    }
}

/// Running min/max of a sliding window (monotonic deques)
#[derive(Debug, Default)]
struct SlidingExtrema {
    min: VecDeque<(usize, u64)>,
    max: VecDeque<(usize, u64)>,
}

impl SlidingExtrema {
    fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, index: usize, value: u64) {
        while self.min.back().is_some_and(|&(_, v)| v >= value) {
            self.min.pop_back();
        }
        self.min.push_back((index, value));

        while self.max.back().is_some_and(|&(_, v)| v <= value) {
            self.max.pop_back();
        }
        self.max.push_back((index, value));
    }

    fn evict_before(&mut self, first: usize) {
        while self.min.front().is_some_and(|&(i, _)| i < first) {
            self.min.pop_front();
        }
        while self.max.front().is_some_and(|&(i, _)| i < first) {
            self.max.pop_front();
        }
    }

    fn range(&self) -> (u64, u64) {
        let lo = self.min.front().map(|&(_, v)| v).unwrap_or(0);
        let hi = self.max.front().map(|&(_, v)| v).unwrap_or(0);
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / 60.0).collect()
    }

    fn analyzer(window_size: usize) -> ConvergenceAnalyzer {
        ConvergenceAnalyzer::with_config(ConvergenceConfig {
            window_size,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_analyzer_creation() {
        let analyzer = ConvergenceAnalyzer::new();
        assert_eq!(analyzer.config().window_size, 500);
        assert_eq!(analyzer.config().slope_threshold, 0.01);
        assert_eq!(analyzer.config().volume_tolerance, 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(ConvergenceConfig::default().validate().is_ok());

        let config = ConvergenceConfig {
            window_size: 1,
            ..Default::default()
        };
        assert!(ConvergenceAnalyzer::with_config(config).is_err());

        let config = ConvergenceConfig {
            slope_threshold: -0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_counts_converge_on_flat_window() {
        let time = hours(20);
        let values = vec![7.0; 20];
        let outcome = analyzer(5).scan_counts(&time, &values);
        assert_eq!(outcome.index(), Some(5));
        assert_eq!(outcome.time(), Some(time[5]));
    }

    #[test]
    fn test_counts_never_converge_on_ramp() {
        let time = hours(50);
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let outcome = analyzer(10).scan_counts(&time, &values);
        assert_eq!(outcome, ConvergenceOutcome::DoesNotConverge);
    }

    #[test]
    fn test_volumes_first_match() {
        let time = hours(12);
        // window 3, exact equality: i=3 fails, i=4 passes, i=5 fails
        let raw = vec![0, 5, 5, 5, 5, 9, 9, 9, 9, 9, 9, 9];
        let cfg = ConvergenceConfig {
            window_size: 3,
            volume_tolerance: 0,
            ..Default::default()
        };
        let (outcome, range) = ConvergenceAnalyzer::with_config(cfg)
            .unwrap()
            .scan_volumes(&time, &raw);
        assert_eq!(outcome.index(), Some(4));
        assert_eq!(outcome.time(), Some(time[4]));
        assert_eq!(range.min.raw(), 5);
        assert_eq!(range.max.raw(), 5);

        // a looser tolerance already accepts i=3
        let cfg = ConvergenceConfig {
            window_size: 3,
            volume_tolerance: 5,
            ..Default::default()
        };
        let outcome = ConvergenceAnalyzer::with_config(cfg)
            .unwrap()
            .scan_volumes(&time, &raw)
            .0;
        assert_eq!(outcome.index(), Some(3));
    }

    #[test]
    fn test_volume_range_of_last_window() {
        let time = hours(6);
        let raw = vec![1, 50, 3, 9, 2, 70];
        let (outcome, range) = analyzer(3).scan_volumes(&time, &raw);
        assert_eq!(outcome, ConvergenceOutcome::DoesNotConverge);
        // last window examined is raw[2..5]
        assert_eq!(range.min.raw(), 2);
        assert_eq!(range.max.raw(), 9);
    }

    #[test]
    fn test_numeric_volume_rejects_fraction() {
        let series = TimeSeries::new(hours(4))
            .unwrap()
            .with_column("vol", Samples::Numeric(vec![1.0, 2.5, 3.0, 4.0]))
            .unwrap();
        let result = analyzer(2).analyze(&series);
        assert!(matches!(result, Err(ReviewError::Format { .. })));
    }

    #[test]
    fn test_final_volume_prefers_plain_vol_column() {
        let text = |v: &[&str]| Samples::Abbreviated(v.iter().map(|s| s.to_string()).collect());
        let series = TimeSeries::new(hours(3))
            .unwrap()
            .with_column("volPO1", text(&["1", "2", "3"]))
            .unwrap()
            .with_column("vol", text(&["4'", "5'", "1234567"]))
            .unwrap();
        let report = analyzer(2).analyze(&series).unwrap();
        assert_eq!(report.final_volume_cell(), "(1234')");
    }

    #[test]
    fn test_other_columns_ignored() {
        let series = TimeSeries::new(hours(4))
            .unwrap()
            .with_column("Qin", Samples::Numeric(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let report = analyzer(2).analyze(&series).unwrap();
        assert!(report.columns.is_empty());
        assert!(report.final_volume.is_none());
        assert_eq!(report.final_volume_cell(), "");
    }

    #[test]
    fn test_tolerance_applies_to_decoded_volumes() {
        let text = Samples::Abbreviated(vec!["1234'".into(), "1234'".into(), "1235'".into()]);
        let series = TimeSeries::new(hours(3))
            .unwrap()
            .with_column("vol", text)
            .unwrap();

        let report = analyzer(2).analyze(&series).unwrap();
        assert_eq!(report.outcome("vol"), Some(ConvergenceOutcome::DoesNotConverge));

        let loose = ConvergenceAnalyzer::with_config(ConvergenceConfig {
            window_size: 2,
            volume_tolerance: 1000,
            ..Default::default()
        })
        .unwrap();
        let report = loose.analyze(&series).unwrap();
        assert_eq!(report.outcome("vol").and_then(|o| o.index()), Some(2));
    }
}
