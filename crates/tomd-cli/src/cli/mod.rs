//! CLI for the tomd batch converter.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tomd_core::config::{self, RunOverrides};
use tomd_core::logging;

use commands::{run_convert, run_formats, run_status};

/// Top-level CLI for the tomd batch converter.
#[derive(Debug, Parser)]
#[command(name = "tomd")]
#[command(about = "tomd: resumable batch conversion of documents to Markdown", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Convert every matching file under SOURCE into Markdown under TARGET.
    Convert {
        /// Directory to scan.
        source: PathBuf,

        /// Output directory (default: SOURCE/md_output).
        target: Option<PathBuf>,

        /// Only scan the top level of SOURCE.
        #[arg(long)]
        no_recursive: bool,

        /// Comma-separated extensions to include, e.g. "pdf,docx" (default: all files).
        #[arg(short = 'f', long, value_name = "EXTS")]
        file_types: Option<String>,

        /// Number of concurrent conversions (values below 1 mean 1).
        #[arg(short = 't', long, value_name = "N", allow_negative_numbers = true)]
        threads: Option<i64>,

        /// Debug output on the console.
        #[arg(short, long)]
        verbose: bool,

        /// Walk the queue without converting anything or touching the checkpoint.
        #[arg(long)]
        dry_run: bool,

        /// Convert even when the output file already exists.
        #[arg(long)]
        overwrite: bool,

        /// Checkpoint file; relative paths are resolved against TARGET.
        #[arg(long, value_name = "PATH")]
        checkpoint: Option<PathBuf>,

        /// Per-file conversion timeout in seconds (0 disables).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Config file to use instead of the default XDG location.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Show what a checkpoint file records.
    Status {
        /// Path to the checkpoint file.
        checkpoint: PathBuf,
    },

    /// List the input formats the default converter handles.
    Formats,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        cli.command.run().await
    }

    async fn run(self) -> Result<ExitCode> {
        match self {
            CliCommand::Convert {
                source,
                target,
                no_recursive,
                file_types,
                threads,
                verbose,
                dry_run,
                overwrite,
                checkpoint,
                timeout,
                config: config_file,
            } => {
                let cfg = match config_file {
                    Some(path) => config::load_from_path(&path)?,
                    None => config::load_or_init()?,
                };
                let overrides = RunOverrides {
                    source_dir: source,
                    target_dir: target,
                    recursive: no_recursive.then_some(false),
                    file_types,
                    threads,
                    overwrite,
                    checkpoint_file: checkpoint,
                    convert_timeout_secs: timeout,
                    dry_run,
                    verbose,
                };
                run_convert(&cfg, overrides).await
            }
            CliCommand::Status { checkpoint } => {
                logging::init_logging_stderr(false);
                run_status(&checkpoint)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Formats => {
                logging::init_logging_stderr(false);
                let cfg = config::load_or_init()?;
                run_formats(&cfg);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

#[cfg(test)]
mod tests;
