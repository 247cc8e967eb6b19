// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Preferred for YouTube: the module ships extractor updates faster than
// most distro binaries and is less likely to be stale.

use async_trait::async_trait;

use super::json::parse_dump_json;
use super::traits::{ExtractorConfig, InfoExtractor, RawVideoInfo};
use crate::downloader::errors::DownloadError;
use crate::downloader::utils::{python_cmd, python_has_module, run_output_with_timeout};

pub struct PythonInfoExtractor {
    python: String,
}

impl PythonInfoExtractor {
    pub fn new() -> Self {
        Self {
            python: python_cmd(),
        }
    }

    fn build_args(&self, url: &str, config: &ExtractorConfig) -> Vec<String> {
        vec![
            "-m".to_string(),
            "yt_dlp".to_string(),
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.timeout_secs.to_string(),
            "--retries".to_string(),
            "2".to_string(),
            url.to_string(),
        ]
    }
}

impl Default for PythonInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp-python"
    }

    fn is_available(&self) -> bool {
        python_has_module("yt_dlp")
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawVideoInfo, DownloadError> {
        let args = self.build_args(url, config);
        let output = run_output_with_timeout(&self.python, args, config.timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!(extractor = self.name(), %stderr, "extraction failed");
            return Err(stderr.into());
        }

        parse_dump_json(&output.stdout)
    }
}
