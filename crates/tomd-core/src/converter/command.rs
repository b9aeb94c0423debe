//! External program converter (e.g. `markitdown <input> -o <output>`).

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{Conversion, Converter};
use crate::descriptor::FileDescriptor;
use crate::error::ConvertError;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Longest stderr excerpt kept in an error message.
const MAX_STDERR_CHARS: usize = 512;

/// Runs `program args...` per file with `{input}`/`{output}` substituted.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn args_for(&self, d: &FileDescriptor) -> Vec<String> {
        let input = d.source_path.to_string_lossy();
        let output = d.output_path.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

#[async_trait]
impl Converter for CommandConverter {
    fn name(&self) -> &str {
        "command"
    }

    async fn convert(&self, descriptor: &FileDescriptor) -> Result<Conversion, ConvertError> {
        let started = Instant::now();
        if let Some(parent) = descriptor.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let program = self.program.to_string_lossy().to_string();
        let output = Command::new(&self.program)
            .args(self.args_for(descriptor))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ConvertError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .trim()
                .chars()
                .take(MAX_STDERR_CHARS)
                .collect();
            return Err(ConvertError::CommandFailed {
                program,
                status: output.status,
                stderr,
            });
        }

        if !tokio::fs::try_exists(&descriptor.output_path).await? {
            return Err(ConvertError::MissingOutput(descriptor.output_path.clone()));
        }

        Ok(Conversion {
            message: "converted".to_string(),
            duration: started.elapsed(),
        })
    }
}
