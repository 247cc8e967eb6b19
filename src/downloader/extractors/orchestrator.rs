// InfoExtractor orchestrator - ordered fallback between extraction modes
//
// Strategy: Python module first (fresher extractor code), native binary
// second. Unavailable extractors are skipped; the last real failure wins.

use serde::{Deserialize, Serialize};

use super::cli::CliInfoExtractor;
use super::python::PythonInfoExtractor;
use super::traits::{ExtractorConfig, InfoExtractor, RawVideoInfo};
use crate::downloader::errors::DownloadError;

pub struct InfoExtractorOrchestrator {
    python: PythonInfoExtractor,
    cli: CliInfoExtractor,
}

/// Tool availability, reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorStatus {
    pub python_available: bool,
    pub cli_available: bool,
}

impl ExtractorStatus {
    pub fn any_available(&self) -> bool {
        self.python_available || self.cli_available
    }
}

impl InfoExtractorOrchestrator {
    pub fn new() -> Self {
        Self {
            python: PythonInfoExtractor::new(),
            cli: CliInfoExtractor::new(),
        }
    }

    pub fn status(&self) -> ExtractorStatus {
        ExtractorStatus {
            python_available: self.python.is_available(),
            cli_available: self.cli.is_available(),
        }
    }

    /// Extract raw video info, falling back from Python to CLI.
    pub async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawVideoInfo, DownloadError> {
        let extractors: [&dyn InfoExtractor; 2] = [&self.python, &self.cli];
        let mut last_error: Option<DownloadError> = None;

        for extractor in extractors {
            if !extractor.is_available() {
                tracing::debug!(extractor = extractor.name(), "skipped: not available");
                continue;
            }

            tracing::debug!(extractor = extractor.name(), url, "trying extractor");
            match extractor.extract(url, config).await {
                Ok(info) => {
                    tracing::info!(extractor = extractor.name(), video = %info.id, "extraction ok");
                    return Ok(info);
                }
                Err(e) => {
                    tracing::warn!(extractor = extractor.name(), error = %e, "extractor failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DownloadError::ToolNotFound(
                "Neither the yt_dlp Python module nor the yt-dlp binary is available".to_string(),
            )
        }))
    }
}

impl Default for InfoExtractorOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
