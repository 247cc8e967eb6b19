// CLI InfoExtractor - uses the native `yt-dlp` binary
//
// Fallback when the Python module is missing. Binary location comes from
// YTDLP_PATH or common install paths.

use async_trait::async_trait;
use std::process::Command as StdCommand;

use super::json::parse_dump_json;
use super::traits::{ExtractorConfig, InfoExtractor, RawVideoInfo};
use crate::downloader::errors::DownloadError;
use crate::downloader::utils::{find_ytdlp, run_output_with_timeout};

pub struct CliInfoExtractor {
    ytdlp_path: String,
}

impl CliInfoExtractor {
    pub fn new() -> Self {
        Self {
            ytdlp_path: find_ytdlp(),
        }
    }

    fn has_ytdlp_binary(&self) -> bool {
        match StdCommand::new(&self.ytdlp_path)
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }

    fn build_args(&self, url: &str, config: &ExtractorConfig) -> Vec<String> {
        vec![
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

impl Default for CliInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp-cli"
    }

    fn is_available(&self) -> bool {
        self.has_ytdlp_binary()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawVideoInfo, DownloadError> {
        let args = self.build_args(url, config);
        let output = run_output_with_timeout(&self.ytdlp_path, args, config.timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!(extractor = self.name(), %stderr, "extraction failed");
            return Err(stderr.into());
        }

        parse_dump_json(&output.stdout)
    }
}
