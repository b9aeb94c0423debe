//! Persist checkpoints as JSON so an interrupted run can resume.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{Checkpoint, CheckpointStore};
use crate::descriptor::FileDescriptor;

/// Checkpoint file on disk. Writes go to `<path>.part` and are renamed into
/// place, so a crash mid-write leaves the previous checkpoint intact.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut o = self.path.as_os_str().to_owned();
        o.push(".part");
        PathBuf::from(o)
    }

    /// Save a snapshot (creates parent dir if needed).
    pub fn try_save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_vec(checkpoint).context("serialize checkpoint")?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).with_context(|| format!("write checkpoint: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename checkpoint into {}", self.path.display()))?;
        Ok(())
    }

    /// Load the checkpoint. Missing file is `Ok(None)`; unreadable or invalid is `Err`.
    pub fn try_load(&self) -> Result<Option<Checkpoint>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read checkpoint: {}", self.path.display()))
            }
        };
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse checkpoint: {}", self.path.display()))?;
        Ok(Some(checkpoint))
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn save(&self, completed: &[FileDescriptor], pending: &[FileDescriptor]) {
        let checkpoint = Checkpoint::new(completed, pending);
        if let Err(e) = self.try_save(&checkpoint) {
            tracing::warn!(error = %format!("{:#}", e), "could not save checkpoint");
        }
    }

    fn load(&self) -> Option<Checkpoint> {
        match self.try_load() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "ignoring unusable checkpoint");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(name: &str, size: u64) -> FileDescriptor {
        FileDescriptor::new(format!("/src/{name}"), format!("/out/{name}.md"), size)
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCheckpointStore::new(dir.path().join("nested/cp.json"));
        store.save(&[d("a.pdf", 1)], &[d("b.pdf", 2), d("c.pdf", 3)]);

        let cp = store.load().expect("checkpoint present");
        assert_eq!(cp.completed, vec![d("a.pdf", 1)]);
        assert_eq!(cp.pending.len(), 2);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn file_has_expected_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCheckpointStore::new(dir.path().join("cp.json"));
        store.save(&[d("a.pdf", 1)], &[]);
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert!(raw["timestamp"].is_string());
        assert_eq!(raw["completed"][0]["source_path"], "/src/a.pdf");
        assert_eq!(raw["pending"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCheckpointStore::new(dir.path().join("absent.json"));
        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn malformed_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = JsonCheckpointStore::new(&path);
        assert!(store.try_load().is_err());
        assert!(store.load().is_none());
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let store = JsonCheckpointStore::new(blocker.join("cp.json"));
        store.save(&[d("a.pdf", 1)], &[]);
        assert!(store.load().is_none());
    }
}
