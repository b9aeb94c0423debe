use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default checkpoint file name; relative paths resolve against the target directory.
pub const DEFAULT_CHECKPOINT_FILE: &str = ".tomd_checkpoint.json";

/// Output directory used when no target is given: `<source>/md_output`.
pub const DEFAULT_TARGET_SUBDIR: &str = "md_output";

/// External converter invocation (optional `[converter]` section in config.toml).
///
/// `{input}` and `{output}` in `args` are replaced with the source and output paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "markitdown".to_string(),
            args: vec!["{input}".into(), "-o".into(), "{output}".into()],
        }
    }
}

/// Global configuration loaded from `~/.config/tomd/config.toml`.
///
/// Unknown keys are rejected so a typo never silently falls back to a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomdConfig {
    /// Number of concurrent conversions; values below 1 are raised to 1.
    pub threads: i64,
    /// Descend into subdirectories of the source tree.
    pub recursive: bool,
    /// Extensions to convert (empty = all).
    pub file_types: Vec<String>,
    /// Reconvert files whose output already exists.
    pub overwrite: bool,
    /// Checkpoint file; relative paths are placed under the target directory.
    pub checkpoint_file: PathBuf,
    /// Per-file conversion timeout in seconds (None = wait indefinitely).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert_timeout_secs: Option<u64>,
    pub converter: ConverterConfig,
}

impl Default for TomdConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            recursive: true,
            file_types: Vec::new(),
            overwrite: false,
            checkpoint_file: PathBuf::from(DEFAULT_CHECKPOINT_FILE),
            convert_timeout_secs: None,
            converter: ConverterConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tomd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TomdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TomdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<TomdConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: TomdConfig = toml::from_str(&data)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(cfg)
}

/// The options the scheduler consumes. Built once, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    thread_count: usize,
    overwrite: bool,
    checkpoint_path: PathBuf,
    convert_timeout: Option<Duration>,
}

impl SchedulerConfig {
    /// A zero thread count is clamped to 1.
    pub fn new(thread_count: usize, overwrite: bool, checkpoint_path: impl Into<PathBuf>) -> Self {
        Self {
            thread_count: thread_count.max(1),
            overwrite,
            checkpoint_path: checkpoint_path.into(),
            convert_timeout: None,
        }
    }

    pub fn with_convert_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.convert_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    pub fn convert_timeout(&self) -> Option<Duration> {
        self.convert_timeout
    }
}

/// Command-line values that override the file configuration (None = keep file value).
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub source_dir: PathBuf,
    pub target_dir: Option<PathBuf>,
    pub recursive: Option<bool>,
    pub file_types: Option<String>,
    pub threads: Option<i64>,
    pub overwrite: bool,
    pub checkpoint_file: Option<PathBuf>,
    pub convert_timeout_secs: Option<u64>,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Fully resolved settings for one `convert` run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub recursive: bool,
    pub file_types: Vec<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub converter: ConverterConfig,
    pub scheduler: SchedulerConfig,
}

impl RunSettings {
    /// Merge file config and CLI overrides, validate the source directory and
    /// make every path absolute.
    pub fn resolve(cfg: &TomdConfig, args: RunOverrides) -> std::result::Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;

        let source_dir = absolutize(&cwd, &args.source_dir);
        if !source_dir.exists() {
            return Err(ConfigError::SourceNotFound(source_dir));
        }
        if !source_dir.is_dir() {
            return Err(ConfigError::SourceNotDirectory(source_dir));
        }

        let target_dir = match args.target_dir.as_deref() {
            Some(t) if !t.as_os_str().is_empty() => absolutize(&cwd, t),
            _ => source_dir.join(DEFAULT_TARGET_SUBDIR),
        };

        let file_types = match args.file_types.as_deref() {
            Some(list) => parse_file_types(list),
            None => normalize_file_types(&cfg.file_types),
        };

        let checkpoint = args
            .checkpoint_file
            .clone()
            .unwrap_or_else(|| cfg.checkpoint_file.clone());
        let checkpoint_path = absolutize(&target_dir, &checkpoint);

        let timeout_secs = args.convert_timeout_secs.or(cfg.convert_timeout_secs);
        let threads = args.threads.unwrap_or(cfg.threads).max(1);
        let scheduler = SchedulerConfig::new(
            usize::try_from(threads).unwrap_or(usize::MAX),
            args.overwrite || cfg.overwrite,
            checkpoint_path,
        )
        .with_convert_timeout(timeout_secs.map(Duration::from_secs));

        Ok(Self {
            source_dir,
            target_dir,
            recursive: args.recursive.unwrap_or(cfg.recursive),
            file_types,
            dry_run: args.dry_run,
            verbose: args.verbose,
            converter: cfg.converter.clone(),
            scheduler,
        })
    }

    /// Directory for run logs and reports: `<target>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.target_dir.join("logs")
    }
}

fn absolutize(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Parse a comma-separated extension list (`"pdf, .DOCX"` → `["pdf", "docx"]`).
pub fn parse_file_types(list: &str) -> Vec<String> {
    let parts: Vec<String> = list.split(',').map(str::to_string).collect();
    normalize_file_types(&parts)
}

fn normalize_file_types(types: &[String]) -> Vec<String> {
    types
        .iter()
        .map(|t| t.trim().trim_start_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
