// InfoExtractor trait and raw extraction types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::downloader::errors::DownloadError;

/// Configuration for info extraction.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl ExtractorConfig {
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }
}

/// One format entry as reported by the extractor, before display mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFormat {
    /// Format id; for YouTube this is the numeric itag.
    pub format_id: String,
    pub ext: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub tbr: Option<f32>,
    pub abr: Option<f32>,
    pub format_note: Option<String>,
}

impl RawFormat {
    /// Exact size when known, approximate otherwise.
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    pub fn has_video(&self) -> bool {
        self.vcodec
            .as_deref()
            .map_or(false, |v| v != "none" && !v.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        self.acodec
            .as_deref()
            .map_or(false, |a| a != "none" && !a.is_empty())
    }

    /// itag when the format id is numeric (always the case for YouTube).
    pub fn itag(&self) -> Option<u32> {
        self.format_id.parse().ok()
    }
}

/// Raw video info from an extractor. All optional fields degrade to
/// placeholders during display mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub id: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel_url: Option<String>,
    pub channel_verified: bool,
    pub channel_follower_count: Option<u64>,
    pub channel_description: Option<String>,
    pub duration_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    /// Raw upload date as reported by the tool (YYYYMMDD).
    pub upload_date: Option<String>,
    pub description: Option<String>,
    /// Thumbnail URL candidates in upstream order.
    pub thumbnails: Vec<String>,
    pub formats: Vec<RawFormat>,
}

/// Trait for info extractors.
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging).
    fn name(&self) -> &'static str;

    /// Check if this extractor is usable on this host.
    fn is_available(&self) -> bool;

    /// Extract raw video info with formats.
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawVideoInfo, DownloadError>;
}
