//! tuflow-review - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tuflow_review::{
    batch::{check_log, default_review_path, discover_runs, review_run, ReviewOptions},
    cli::{Args, Commands, Config, ConvergenceArgs},
    display::Display,
    ingest::read_tlf,
    output::{log_review_path, run_stem, write_run_summary_csv, ReviewLog},
    telemetry::{TelemetryCollector, TelemetryDisplay, TelemetryEvent},
    ConvergenceOutcome,
};

fn main() -> ExitCode {
    let args = Args::parse();
    let display = Display::new(args.verbosity());

    match run(&args, &display) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, display: &Display) -> Result<()> {
    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    match &args.command {
        Commands::Check {
            log,
            convergence,
            no_plots,
            json,
        } => {
            let options = effective_options(&config, convergence, None, *no_plots)?;
            run_check(display, log, &options, *json)?;
        }
        Commands::Summarize { log, modeler } => {
            let options = effective_options(
                &config,
                &ConvergenceArgs::default(),
                modeler.as_deref(),
                true,
            )?;
            run_summarize(display, log, &options)?;
        }
        Commands::Review {
            dir,
            output,
            convergence,
            modeler,
            no_plots,
        } => {
            let options = effective_options(&config, convergence, modeler.as_deref(), *no_plots)?;
            let output = output.clone().unwrap_or_else(|| default_review_path(dir));
            run_review(display, dir, &output, &options)?;
        }
        Commands::Config { save } => {
            show_config(args, &config)?;
            if *save {
                save_config(display, args, &config)?;
            }
        }
    }

    Ok(())
}

/// Config file values overlaid with command-line flags
fn effective_options(
    config: &Config,
    convergence: &ConvergenceArgs,
    modeler: Option<&str>,
    no_plots: bool,
) -> Result<ReviewOptions> {
    let mut config = config.clone();
    convergence.apply(&mut config.convergence);
    if let Some(modeler) = modeler {
        config.review.modeler = Some(modeler.to_string());
    }
    if no_plots {
        config.output.write_plots = false;
    }
    config.validate().context("Invalid settings")?;
    Ok(ReviewOptions::from_config(&config))
}

fn run_check(display: &Display, log: &Path, options: &ReviewOptions, json: bool) -> Result<()> {
    display.detail(&format!(
        "window {} samples, slope threshold {}, volume tolerance {}",
        options.convergence.window_size,
        options.convergence.slope_threshold,
        options.convergence.volume_tolerance
    ));

    let outcome =
        check_log(log, options).with_context(|| format!("Failed to check {}", log.display()))?;

    if json {
        println!("{}", outcome.report.to_json()?);
    } else {
        display.show_report(&run_stem(log), &outcome.report);
    }

    display.wrote(&outcome.summary_csv);
    for plot in &outcome.plots {
        display.wrote(plot);
    }
    Ok(())
}

fn run_summarize(display: &Display, log: &Path, options: &ReviewOptions) -> Result<()> {
    let summary = read_tlf(log, &options.modeler)
        .with_context(|| format!("Failed to summarize {}", log.display()))?;

    let path = log_review_path(log);
    write_run_summary_csv(&summary, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    for (label, value) in &summary.fields {
        display.detail(&format!("{}: {}", label, value));
    }
    display.success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn run_review(display: &Display, dir: &Path, output: &Path, options: &ReviewOptions) -> Result<()> {
    let runs =
        discover_runs(dir).with_context(|| format!("Failed to scan {}", dir.display()))?;
    if runs.is_empty() {
        display.warning(&format!("No .tlf logs found under {}", dir.display()));
        return Ok(());
    }
    display.info(&format!("Reviewing {} runs in {}", runs.len(), dir.display()));

    let telemetry = TelemetryCollector::new();
    let mut review_log = ReviewLog::new(output);
    let pb = display.progress_bar(runs.len() as u64);

    for logs in &runs {
        pb.set_message(logs.run.clone());
        let started = Instant::now();

        let result = review_run(logs, options).and_then(|review| {
            let (header, row) = review.merged_row();
            review_log.append(&header, &row)?;
            Ok(review)
        });

        match result {
            Ok(review) => {
                telemetry.record(TelemetryEvent::RunAnalyzed {
                    run: review.run.clone(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    timestamp: Instant::now(),
                });
                for entry in &review.check.report.columns {
                    let run = review.run.clone();
                    let column = entry.column.clone();
                    telemetry.record(match entry.outcome {
                        ConvergenceOutcome::Converged { time, .. } => {
                            TelemetryEvent::QuantityConverged { run, column, time }
                        }
                        ConvergenceOutcome::DoesNotConverge => {
                            TelemetryEvent::QuantityNotConverged { run, column }
                        }
                    });
                }
                if display.verbosity().show_details() {
                    pb.suspend(|| display.show_report(&review.run, &review.check.report));
                }
                pb.suspend(|| {
                    display.wrote(&review.log_review_csv);
                    display.wrote(&review.check.summary_csv);
                });
            }
            Err(e) => {
                telemetry.record(TelemetryEvent::RunFailed {
                    run: logs.run.clone(),
                    reason: e.to_string(),
                    timestamp: Instant::now(),
                });
                pb.suspend(|| display.warning(&format!("Skipping {}: {}", logs.run, e)));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    TelemetryDisplay::new(telemetry, display.verbosity()).display_summary();

    let rows = review_log.rows_written();
    let path = review_log
        .finish()
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if rows > 0 {
        display.success(&format!("Wrote {} rows to {}", rows, path.display()));
    } else {
        display.warning("No run could be reviewed; nothing written");
    }
    Ok(())
}

/// `--config` path, else the standard location
fn config_path(args: &Args) -> Option<PathBuf> {
    args.config.clone().or_else(Config::default_path)
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = config_path(args).unwrap_or_else(|| PathBuf::from("(built-in defaults)"));

    println!("{}", "tuflow-review configuration".bold().cyan());
    println!("{}", format!("# {}", source.display()).dimmed());
    println!("# verbosity: {}", args.verbosity().as_str());
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}

fn save_config(display: &Display, args: &Args, config: &Config) -> Result<()> {
    let path = config_path(args).context("No home directory; pass --config to choose a file")?;
    config
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    display.success(&format!("Saved configuration to {}", path.display()));
    Ok(())
}
