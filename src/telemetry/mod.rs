//! Batch telemetry for tuflow-review
//!
//! Collects per-run events during a review and prints a closing summary.

use crate::cli::Verbosity;
use colored::*;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    RunAnalyzed {
        run: String,
        duration_ms: u64,
        timestamp: Instant,
    },
    RunFailed {
        run: String,
        reason: String,
        timestamp: Instant,
    },
    QuantityConverged {
        run: String,
        column: String,
        time: f64,
    },
    QuantityNotConverged {
        run: String,
        column: String,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryStats {
    pub runs_analyzed: usize,
    pub runs_failed: usize,
    pub quantities_converged: usize,
    pub quantities_not_converged: usize,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::RunAnalyzed { .. } => stats.runs_analyzed += 1,
                TelemetryEvent::RunFailed { .. } => stats.runs_failed += 1,
                TelemetryEvent::QuantityConverged { .. } => stats.quantities_converged += 1,
                TelemetryEvent::QuantityNotConverged { .. } => stats.quantities_not_converged += 1,
            }
        }

        lock(&self.events).push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Runs that failed, with their reasons
    pub fn failures(&self) -> Vec<(String, String)> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::RunFailed { run, reason, .. } => {
                    Some((run.clone(), reason.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Runs with at least one quantity that did not converge
    pub fn unconverged_runs(&self) -> Vec<String> {
        let mut runs: Vec<String> = Vec::new();
        for event in lock(&self.events).iter() {
            if let TelemetryEvent::QuantityNotConverged { run, .. } = event {
                if !runs.contains(run) {
                    runs.push(run.clone());
                }
            }
        }
        runs
    }

    /// Fraction of attempted runs that produced a report
    pub fn success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.runs_analyzed + stats.runs_failed;
        if total == 0 {
            1.0
        } else {
            stats.runs_analyzed as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: Verbosity,
}

impl TelemetryDisplay {
    /// Create a new display
    pub fn new(collector: TelemetryCollector, verbosity: Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.verbosity.show_progress() {
            return;
        }

        let stats = self.collector.get_stats();
        let elapsed = self.collector.elapsed();

        println!("\n{}", "Review Summary".bold());
        println!("─────────────────────────────────────");
        println!("Duration:          {:.2?}", elapsed);
        println!("Runs analyzed:     {}", stats.runs_analyzed);
        println!("Runs failed:       {}", stats.runs_failed);
        println!("Success rate:      {:.1}%", self.collector.success_rate() * 100.0);
        println!("Converged:         {}", stats.quantities_converged);
        println!("Did not converge:  {}", stats.quantities_not_converged);

        if self.should_show_details() {
            for run in self.collector.unconverged_runs() {
                println!("  {} {}", "DNC".yellow(), run);
            }
            for (run, reason) in self.collector.failures() {
                println!("  {} {}: {}", "failed".red(), run, reason);
            }
        }
        println!();
    }

    /// Check if should show detailed output
    pub fn should_show_details(&self) -> bool {
        self.verbosity.show_details()
    }
}
