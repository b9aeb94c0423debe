//! Per-file conversion capability.
//!
//! The scheduler only sees the [`Converter`] trait. Three implementations ship:
//! an external command (default `markitdown`), a built-in metadata summary used
//! when that command is unavailable, and a dry-run converter that writes nothing.

mod command;
mod dry_run;
mod summary;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConverterConfig;
use crate::descriptor::FileDescriptor;
use crate::error::ConvertError;

pub use command::CommandConverter;
pub use dry_run::DryRunConverter;
pub use summary::SummaryConverter;

/// Input formats the default toolchain can turn into Markdown.
pub const SUPPORTED_FORMATS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "html", "htm", "jpg", "jpeg",
    "png", "mp3", "mp4", "epub", "zip",
];

/// A successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub message: String,
    pub duration: Duration,
}

/// Converts one source file into its planned output.
///
/// Returning `Err` marks the file as failed; it never aborts the batch.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    async fn convert(&self, descriptor: &FileDescriptor) -> Result<Conversion, ConvertError>;
}

/// Pick the converter for a run: dry-run, the configured command if it can be
/// found on `PATH`, otherwise the built-in summary writer.
pub fn from_settings(dry_run: bool, cfg: &ConverterConfig) -> Arc<dyn Converter> {
    if dry_run {
        return Arc::new(DryRunConverter::default());
    }
    match find_program(&cfg.program) {
        Some(path) => {
            tracing::debug!(program = %path.display(), "using external converter");
            Arc::new(CommandConverter::new(path, cfg.args.clone()))
        }
        None => {
            tracing::warn!(
                program = %cfg.program,
                "converter program not found; writing metadata summaries instead"
            );
            Arc::new(SummaryConverter)
        }
    }
}

/// Resolve `program` the way a shell would: paths with a separator are taken
/// as-is, bare names are looked up in `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_found() {
        assert!(find_program("tomd-no-such-converter-binary").is_none());
        assert!(find_program("/definitely/not/here/markitdown").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn absolute_program_path_is_accepted() {
        assert_eq!(find_program("/bin/sh"), Some(PathBuf::from("/bin/sh")));
    }

    #[test]
    fn dry_run_wins_over_command() {
        let c = from_settings(true, &ConverterConfig::default());
        assert_eq!(c.name(), "dry-run");
    }

    #[test]
    fn falls_back_to_summary_when_program_missing() {
        let cfg = ConverterConfig {
            program: "tomd-no-such-converter-binary".into(),
            args: vec![],
        };
        assert_eq!(from_settings(false, &cfg).name(), "summary");
    }
}
