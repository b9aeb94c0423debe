use async_trait::async_trait;
use std::time::{Duration, Instant};

use super::{Conversion, Converter};
use crate::descriptor::FileDescriptor;
use crate::error::ConvertError;

/// Simulates a conversion: waits `delay`, writes nothing, reports success.
#[derive(Debug, Clone, Copy)]
pub struct DryRunConverter {
    delay: Duration,
}

impl DryRunConverter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for DryRunConverter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl Converter for DryRunConverter {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn convert(&self, _descriptor: &FileDescriptor) -> Result<Conversion, ConvertError> {
        let started = Instant::now();
        tokio::time::sleep(self.delay).await;
        Ok(Conversion {
            message: "[dry run] not converted".to_string(),
            duration: started.elapsed(),
        })
    }
}
