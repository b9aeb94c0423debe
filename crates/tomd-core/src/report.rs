//! Per-result logging and the end-of-run JSON report.
//!
//! The scheduler hands every [`TaskResult`] to an injected [`ResultSink`].
//! [`LogSink`] only logs; [`ReportBuilder`] also keeps the results so a
//! report can be written to `<target>/logs` when the run ends.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::scheduler::{Outcome, TaskResult};

/// Receives each task result as the scheduler processes it.
pub trait ResultSink: Send + Sync {
    fn record(&self, result: &TaskResult);
}

fn log_result(r: &TaskResult) {
    let d = &r.descriptor;
    match r.outcome {
        Outcome::Success => tracing::info!(
            "converted {} -> {} ({:.2}s)",
            d.source_path.display(),
            d.output_path.display(),
            r.duration.as_secs_f64()
        ),
        Outcome::Failure => {
            tracing::error!("failed {}: {}", d.source_path.display(), r.message)
        }
        Outcome::Skipped => {
            tracing::warn!("skipped {}: {}", d.source_path.display(), r.message)
        }
    }
}

/// Logs each result; keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn record(&self, result: &TaskResult) {
        log_result(result);
    }
}

/// One line of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub status: Outcome,
    pub message: String,
    pub duration_secs: f64,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub skipped: usize,
    pub total_duration_secs: f64,
}

/// Final run report, serialized as `tomd_report_<timestamp>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub results: Vec<ReportEntry>,
    pub timestamp: DateTime<Local>,
}

impl Report {
    /// Write the report into `dir` (created if needed) and return its path.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;
        let path = dir.join(format!(
            "tomd_report_{}.json",
            self.timestamp.format("%Y%m%d_%H%M%S")
        ));
        let json = serde_json::to_string_pretty(self).context("serialize report")?;
        std::fs::write(&path, json).with_context(|| format!("write report: {}", path.display()))?;
        Ok(path)
    }
}

/// Logs results and accumulates them for [`Report`].
#[derive(Debug, Default)]
pub struct ReportBuilder {
    entries: Mutex<Vec<ReportEntry>>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self) -> Report {
        let results = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let count = |o: Outcome| results.iter().filter(|e| e.status == o).count();
        let summary = ReportSummary {
            total: results.len(),
            success: count(Outcome::Success),
            failure: count(Outcome::Failure),
            skipped: count(Outcome::Skipped),
            total_duration_secs: results.iter().map(|e| e.duration_secs).sum(),
        };
        Report {
            summary,
            results,
            timestamp: Local::now(),
        }
    }
}

impl ResultSink for ReportBuilder {
    fn record(&self, result: &TaskResult) {
        log_result(result);
        let entry = ReportEntry {
            source_path: result.descriptor.source_path.clone(),
            output_path: result.descriptor.output_path.clone(),
            status: result.outcome,
            message: result.message.clone(),
            duration_secs: result.duration.as_secs_f64(),
            timestamp: Local::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
