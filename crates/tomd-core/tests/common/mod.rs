//! Shared fixtures for scheduler integration tests: a scriptable converter and
//! descriptor builders.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tomd_core::converter::{Conversion, Converter};
use tomd_core::error::ConvertError;
use tomd_core::FileDescriptor;

/// Converter driven by file names: `bad*` fails, `boom*` panics, anything else
/// succeeds. Records call order and the peak number of concurrent calls.
#[derive(Debug, Default)]
pub struct FakeConverter {
    calls: Mutex<Vec<PathBuf>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    write_output: bool,
    jitter: bool,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the output file on success, like a real converter.
    pub fn writing_output(mut self) -> Self {
        self.write_output = true;
        self
    }

    /// Sleep 0..4 ms per call, derived from the descriptor size.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Converter for FakeConverter {
    fn name(&self) -> &str {
        "fake"
    }

    async fn convert(&self, d: &FileDescriptor) -> Result<Conversion, ConvertError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(d.source_path.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.jitter {
            tokio::time::sleep(Duration::from_millis(lcg(d.size_bytes) % 4)).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = d
            .source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.starts_with("boom") {
            panic!("converter exploded on {name}");
        }
        if name.starts_with("bad") {
            return Err(ConvertError::MissingOutput(d.output_path.clone()));
        }
        if self.write_output {
            std::fs::write(&d.output_path, "# converted\n")?;
        }
        Ok(Conversion {
            message: "ok".to_string(),
            duration: Duration::from_millis(1),
        })
    }
}

/// Deterministic pseudo-random value for `seed`.
pub fn lcg(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
        >> 33
}

/// Descriptor for `dir/name` with output `dir/name.md`.
pub fn descriptor(dir: &Path, name: &str, size: u64) -> FileDescriptor {
    FileDescriptor::new(dir.join(name), dir.join(format!("{name}.md")), size)
}

pub fn descriptors(dir: &Path, files: &[(&str, u64)]) -> Vec<FileDescriptor> {
    files.iter().map(|(n, s)| descriptor(dir, n, *s)).collect()
}

pub fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
