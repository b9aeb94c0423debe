use async_trait::async_trait;
use std::time::Instant;

use super::{Conversion, Converter};
use crate::descriptor::FileDescriptor;
use crate::error::ConvertError;

/// Writes a Markdown page describing the source file instead of its content.
/// Used when no external converter is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryConverter;

pub(crate) fn render(d: &FileDescriptor) -> String {
    let name = d
        .source_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let kind = if d.detected_type.is_empty() {
        "unknown"
    } else {
        d.detected_type.as_str()
    };
    format!(
        "# {name}\n\n\
         ## File information\n\n\
         - Source: {}\n\
         - Type: {kind}\n\
         - Size: {} bytes\n\n\
         ## Content\n\n\
         No converter was available; this page only records the file's metadata.\n",
        d.source_path.display(),
        d.size_bytes,
    )
}

#[async_trait]
impl Converter for SummaryConverter {
    fn name(&self) -> &str {
        "summary"
    }

    async fn convert(&self, descriptor: &FileDescriptor) -> Result<Conversion, ConvertError> {
        let started = Instant::now();
        if let Some(parent) = descriptor.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&descriptor.output_path, render(descriptor)).await?;
        Ok(Conversion {
            message: "wrote metadata summary".to_string(),
            duration: started.elapsed(),
        })
    }
}
