//! Logging init: console on stderr plus a per-run log file under `<target>/logs`,
//! or graceful fallback to stderr only.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Log file name for a run started now: `tomd_YYYYmmdd_HHMMSS.log`.
pub fn log_file_name() -> String {
    format!("tomd_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Initialize logging to stderr and to a fresh file in `log_dir`.
///
/// The file always records debug detail (or whatever `RUST_LOG` asks for);
/// the console shows info, or debug with `verbose`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir: {}", log_dir.display()))?;
    let log_file_path = log_dir.join(log_file_name());

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open log file: {}", log_file_path.display()))?;

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(FileMakeWriter(file))
        .with_ansi(false)
        .with_filter(file_filter);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(verbose);
    let console_layer = if verbose {
        console_layer.boxed()
    } else {
        console_layer.without_time().boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer.with_filter(console_level(verbose)))
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;

    tracing::debug!("tomd logging initialized at {}", log_file_path.display());

    Ok(log_file_path)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails
/// so the CLI doesn't crash.
pub fn init_logging_stderr(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
