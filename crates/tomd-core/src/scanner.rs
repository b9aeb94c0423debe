//! Source tree traversal: turns a directory into a flat list of descriptors.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::RunSettings;
use crate::descriptor::{detect_type, FileDescriptor};

/// Extension given to every output file.
pub const OUTPUT_EXTENSION: &str = "md";

/// Walks the source directory and plans one output file per input.
#[derive(Debug, Clone)]
pub struct FileScanner {
    source_dir: PathBuf,
    target_dir: PathBuf,
    recursive: bool,
    file_types: Vec<String>,
}

impl FileScanner {
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            recursive: true,
            file_types: Vec::new(),
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(&settings.source_dir, &settings.target_dir)
            .recursive(settings.recursive)
            .file_types(settings.file_types.clone())
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Keep only these (lowercase, dot-less) extensions; empty keeps everything.
    pub fn file_types(mut self, file_types: Vec<String>) -> Self {
        self.file_types = file_types;
        self
    }

    /// Collect descriptors in discovery order (file names sorted per directory).
    ///
    /// The target directory is never entered, so outputs placed inside the
    /// source tree are not picked up again. Unreadable entries are logged and skipped.
    pub fn scan(&self) -> Vec<FileDescriptor> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let target = self.target_dir.as_path();

        WalkDir::new(&self.source_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && e.path() == target))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.describe(e.path(), e.metadata().ok().map(|m| m.len())))
            .filter(|d| self.matches_type(d))
            .collect()
    }

    fn describe(&self, path: &Path, size: Option<u64>) -> Option<FileDescriptor> {
        let Some(size_bytes) = size else {
            warn!(path = %path.display(), "could not read file metadata, skipping");
            return None;
        };
        let rel_path = path.strip_prefix(&self.source_dir).ok()?.to_path_buf();
        let output_path = self
            .target_dir
            .join(&rel_path)
            .with_extension(OUTPUT_EXTENSION);
        Some(FileDescriptor {
            source_path: path.to_path_buf(),
            output_path,
            size_bytes,
            detected_type: detect_type(path),
            rel_path,
        })
    }

    fn matches_type(&self, d: &FileDescriptor) -> bool {
        self.file_types.is_empty() || self.file_types.iter().any(|t| *t == d.detected_type)
    }

    /// Create the target directory and every output parent directory.
    pub fn create_output_directories(&self, files: &[FileDescriptor]) -> Result<()> {
        fs::create_dir_all(&self.target_dir)
            .with_context(|| format!("create target dir: {}", self.target_dir.display()))?;
        let dirs: BTreeSet<&Path> = files
            .iter()
            .filter_map(|f| f.output_path.parent())
            .collect();
        for dir in dirs {
            fs::create_dir_all(dir)
                .with_context(|| format!("create output dir: {}", dir.display()))?;
        }
        Ok(())
    }
}
