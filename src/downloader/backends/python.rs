// yt-dlp via the Python module, streaming to stdout

use async_trait::async_trait;

use super::subprocess::spawn_streaming;
use crate::downloader::errors::DownloadError;
use crate::downloader::format_selector::format_spec;
use crate::downloader::models::StreamRequest;
use crate::downloader::stream::PendingStream;
use crate::downloader::traits::StreamBackend;
use crate::downloader::utils::{python_cmd, python_has_module};

pub struct PythonStreamBackend {
    python: String,
}

impl PythonStreamBackend {
    pub fn new() -> Self {
        Self {
            python: python_cmd(),
        }
    }
}

impl Default for PythonStreamBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamBackend for PythonStreamBackend {
    fn name(&self) -> &'static str {
        "yt-dlp-python"
    }

    fn is_available(&self) -> bool {
        python_has_module("yt_dlp")
    }

    async fn open(&self, request: &StreamRequest) -> Result<PendingStream, DownloadError> {
        let args = vec![
            "-m".to_string(),
            "yt_dlp".to_string(),
            "-f".to_string(),
            format_spec(request),
            "-o".to_string(),
            "-".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            request.url.clone(),
        ];

        spawn_streaming(self.name(), &self.python, args)
    }
}
