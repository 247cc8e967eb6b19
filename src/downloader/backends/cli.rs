// Native yt-dlp binary, streaming to stdout
//
// Last resort in the chain. Binary location comes from YTDLP_PATH or
// common install paths.

use async_trait::async_trait;

use super::subprocess::spawn_streaming;
use crate::downloader::errors::DownloadError;
use crate::downloader::format_selector::format_spec;
use crate::downloader::models::StreamRequest;
use crate::downloader::stream::PendingStream;
use crate::downloader::traits::StreamBackend;
use crate::downloader::utils::find_ytdlp;

pub struct CliStreamBackend {
    ytdlp_path: String,
}

impl CliStreamBackend {
    pub fn new() -> Self {
        Self {
            ytdlp_path: find_ytdlp(),
        }
    }
}

impl Default for CliStreamBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamBackend for CliStreamBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn open(&self, request: &StreamRequest) -> Result<PendingStream, DownloadError> {
        let args = vec![
            "-f".to_string(),
            format_spec(request),
            "-o".to_string(),
            "-".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            request.url.clone(),
        ];

        spawn_streaming(self.name(), &self.ytdlp_path, args)
    }
}
