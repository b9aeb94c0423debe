//! `tomd convert` – scan a directory and convert it with the scheduler.

use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tomd_core::checkpoint::{CheckpointStore, JsonCheckpointStore, MemoryCheckpointStore};
use tomd_core::config::{RunOverrides, RunSettings, TomdConfig};
use tomd_core::converter;
use tomd_core::logging;
use tomd_core::report::ReportBuilder;
use tomd_core::scanner::FileScanner;
use tomd_core::{Scheduler, Summary};

use crate::progress::BarReporter;

/// Exit code for a run stopped by Ctrl-C (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

pub async fn run_convert(cfg: &TomdConfig, overrides: RunOverrides) -> Result<ExitCode> {
    let settings = RunSettings::resolve(cfg, overrides)?;
    let log_dir = settings.log_dir();
    match logging::init_logging(&log_dir, settings.verbose) {
        Ok(path) => tracing::debug!("logging to {}", path.display()),
        Err(e) => {
            logging::init_logging_stderr(settings.verbose);
            tracing::warn!("file logging unavailable, using stderr only: {:#}", e);
        }
    }
    tracing::debug!("resolved settings: {:?}", settings);

    let started = Instant::now();
    tracing::info!("source: {}", settings.source_dir.display());
    tracing::info!("target: {}", settings.target_dir.display());

    let scanner = FileScanner::from_settings(&settings);
    let files = scanner.scan();
    if files.is_empty() {
        println!("No matching files in {}.", settings.source_dir.display());
        return Ok(ExitCode::SUCCESS);
    }
    tracing::info!("found {} file(s)", files.len());
    scanner.create_output_directories(&files)?;

    let converter = converter::from_settings(settings.dry_run, &settings.converter);
    // A dry run must not mark anything completed for the next real run.
    let store: Arc<dyn CheckpointStore> = if settings.dry_run {
        Arc::new(MemoryCheckpointStore::new())
    } else {
        Arc::new(JsonCheckpointStore::new(settings.scheduler.checkpoint_path()))
    };
    let report = Arc::new(ReportBuilder::new());
    let scheduler = Scheduler::new(settings.scheduler.clone(), converter, store)
        .with_reporter(Arc::new(BarReporter::new()))
        .with_result_sink(report.clone());

    let control = scheduler.control();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing in-flight conversions");
            control.request_interrupt();
        }
    });

    scheduler.create_task_queue(files);
    let summary = scheduler.process_queue().await;
    ctrl_c.abort();

    match report.build().write_to_dir(&log_dir) {
        Ok(path) => tracing::info!("report written to {}", path.display()),
        Err(e) => tracing::warn!("could not write report: {:#}", e),
    }
    print_summary(&summary, started.elapsed());

    if summary.interrupted {
        println!(
            "Interrupted. Progress saved to {}; run the same command again to resume.",
            settings.scheduler.checkpoint_path().display()
        );
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &Summary, elapsed: Duration) {
    if summary.total == 0 {
        println!(
            "Nothing to do: all {} file(s) were completed by an earlier run.",
            summary.previously_completed
        );
        return;
    }
    println!("Conversion finished in {:.1}s", elapsed.as_secs_f64());
    println!("  converted: {}", summary.success_count);
    println!("  failed:    {}", summary.failure_count);
    println!("  skipped:   {}", summary.skipped_count);
    if summary.previously_completed > 0 {
        println!("  restored:  {} (completed by an earlier run)", summary.previously_completed);
    }
    if summary.remaining > 0 {
        println!("  remaining: {}", summary.remaining);
    }
    println!(
        "  conversion time: {:.1}s total",
        summary.total_duration.as_secs_f64()
    );
}
