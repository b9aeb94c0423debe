//! File descriptors: one immutable record per input file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One input file and where its Markdown output goes.
///
/// Identity is `source_path`; the scanner guarantees it is unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Absolute path of the source file.
    pub source_path: PathBuf,
    /// Planned output location (`<target>/<rel_path>.md`).
    pub output_path: PathBuf,
    /// Source size in bytes at scan time.
    pub size_bytes: u64,
    /// Lowercase extension without the dot (empty when the file has none).
    pub detected_type: String,
    /// Path relative to the source root.
    #[serde(default)]
    pub rel_path: PathBuf,
}

impl FileDescriptor {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        size_bytes: u64,
    ) -> Self {
        let source_path = source_path.into();
        let detected_type = detect_type(&source_path);
        let rel_path = source_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default();
        Self {
            source_path,
            output_path: output_path.into(),
            size_bytes,
            detected_type,
            rel_path,
        }
    }

    /// Identity key.
    pub fn key(&self) -> &Path {
        &self.source_path
    }
}

/// Lowercase extension of `path`, or an empty string.
pub fn detect_type(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_type_lowercases_extension() {
        assert_eq!(detect_type(Path::new("/docs/Report.PDF")), "pdf");
        assert_eq!(detect_type(Path::new("archive.tar.gz")), "gz");
        assert_eq!(detect_type(Path::new("Makefile")), "");
    }

    #[test]
    fn json_uses_descriptor_field_names() {
        let d = FileDescriptor::new("/src/a.docx", "/out/a.md", 42);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["source_path"], "/src/a.docx");
        assert_eq!(v["output_path"], "/out/a.md");
        assert_eq!(v["size_bytes"], 42);
        assert_eq!(v["detected_type"], "docx");
    }

    #[test]
    fn rel_path_is_optional_when_reading() {
        let json = r#"{
            "source_path": "/src/b.pdf",
            "output_path": "/out/b.md",
            "size_bytes": 7,
            "detected_type": "pdf"
        }"#;
        let d: FileDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.key(), Path::new("/src/b.pdf"));
        assert!(d.rel_path.as_os_str().is_empty());
    }
}
