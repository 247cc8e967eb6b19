// Metadata fetcher - raw extraction mapped into display DTOs
//
// On extractor-outdated failures this degrades to a limited-info success
// built from the video id alone instead of failing outright.

use super::errors::{DownloadError, ErrorCategory};
use super::extractors::{
    ExtractorConfig, ExtractorStatus, InfoExtractorOrchestrator, RawVideoInfo,
};
use super::format_selector::build_download_options;
use super::models::{ChannelInfo, DownloadFormat, VideoInfo};
use super::utils::{format_count, format_duration};
use crate::validator;

/// Everything the preview page needs for one video.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VideoData {
    pub video_info: VideoInfo,
    pub download_options: Vec<DownloadFormat>,
}

/// Fetch result, possibly degraded.
#[derive(Debug, Clone)]
pub struct FetchedVideo {
    pub data: VideoData,
    pub limited_info: bool,
    pub note: Option<String>,
}

pub struct MetadataFetcher {
    orchestrator: InfoExtractorOrchestrator,
    config: ExtractorConfig,
    basic_config: ExtractorConfig,
}

impl MetadataFetcher {
    pub fn new(info_timeout_secs: u64, basic_timeout_secs: u64) -> Self {
        Self {
            orchestrator: InfoExtractorOrchestrator::new(),
            config: ExtractorConfig::default().with_timeout(info_timeout_secs),
            basic_config: ExtractorConfig::default().with_timeout(basic_timeout_secs),
        }
    }

    pub fn status(&self) -> ExtractorStatus {
        self.orchestrator.status()
    }

    /// Fetch display metadata and download options for a video URL.
    pub async fn fetch(&self, url: &str) -> Result<FetchedVideo, DownloadError> {
        let validation = validator::validate_url(url);
        let video_id = match (&validation.video_id, validation.is_valid) {
            (Some(id), true) => id.clone(),
            _ => {
                return Err(DownloadError::InvalidUrl(
                    validation
                        .error
                        .unwrap_or_else(|| "Invalid YouTube URL".to_string()),
                ))
            }
        };

        match self.orchestrator.extract(url, &self.config).await {
            Ok(raw) => {
                let duration = raw.duration_seconds;
                let video_info = map_video_info(&raw, validation.is_short);
                let download_options = build_download_options(&raw.formats, duration);
                Ok(FetchedVideo {
                    data: VideoData {
                        video_info,
                        download_options,
                    },
                    limited_info: false,
                    note: None,
                })
            }
            Err(e) if e.category() == ErrorCategory::ExtractorOutdated => {
                tracing::warn!(video = %video_id, error = %e, "degrading to limited info");
                Ok(limited_fetch(&video_id, validation.is_short))
            }
            Err(e) => Err(e),
        }
    }

    /// Lighter validation call: just the title, on a short timeout.
    pub async fn basic_title(&self, url: &str) -> Result<String, DownloadError> {
        let validation = validator::validate_url(url);
        if !validation.is_valid {
            return Err(DownloadError::InvalidUrl(
                validation
                    .error
                    .unwrap_or_else(|| "Invalid YouTube URL".to_string()),
            ));
        }

        let raw = self.orchestrator.extract(url, &self.basic_config).await?;
        Ok(raw.title.unwrap_or_else(|| "Unknown Title".to_string()))
    }
}

/// Limited-info success built from the video id alone.
pub fn limited_fetch(video_id: &str, is_short: bool) -> FetchedVideo {
    let mut video_info = VideoInfo::placeholder(video_id);
    video_info.is_short = is_short;

    FetchedVideo {
        data: VideoData {
            video_info,
            download_options: vec![DownloadFormat::placeholder()],
        },
        limited_info: true,
        note: Some("Limited information available due to YouTube updates".to_string()),
    }
}

/// Map raw extractor output into the display DTO. Every missing field
/// degrades to a placeholder.
pub fn map_video_info(raw: &RawVideoInfo, is_short: bool) -> VideoInfo {
    VideoInfo {
        id: raw.id.clone(),
        title: raw
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Title".to_string()),
        thumbnail: pick_best_thumbnail(&raw.thumbnails),
        duration: raw
            .duration_seconds
            .map(format_duration)
            .unwrap_or_else(|| "Unknown".to_string()),
        views: raw
            .view_count
            .map(format_count)
            .unwrap_or_else(|| "Unknown".to_string()),
        likes: raw
            .like_count
            .map(format_count)
            .unwrap_or_else(|| "Unknown".to_string()),
        upload_date: raw
            .upload_date
            .as_deref()
            .map(format_upload_date)
            .unwrap_or_else(|| "Unknown".to_string()),
        description: raw.description.clone().unwrap_or_default(),
        is_short,
        channel: ChannelInfo {
            name: raw
                .uploader
                .clone()
                .unwrap_or_else(|| "Unknown Channel".to_string()),
            // dump-json carries no channel avatar for plain videos
            avatar: String::new(),
            subscribers: raw
                .channel_follower_count
                .map(format_count)
                .unwrap_or_else(|| "Unknown".to_string()),
            verified: raw.channel_verified,
            bio: raw.channel_description.clone().filter(|b| !b.is_empty()),
            channel_url: raw.channel_url.clone(),
        },
    }
}

fn pick_best_thumbnail(thumbnails: &[String]) -> String {
    const PREFERRED: [&str; 4] = ["maxresdefault", "hqdefault", "mqdefault", "default"];
    for name in PREFERRED {
        if let Some(url) = thumbnails.iter().find(|u| u.contains(name)) {
            return url.clone();
        }
    }
    thumbnails.first().cloned().unwrap_or_default()
}

// yt-dlp reports YYYYMMDD
fn format_upload_date(raw: &str) -> String {
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_raw(id: &str) -> RawVideoInfo {
        RawVideoInfo {
            id: id.to_string(),
            title: None,
            uploader: None,
            channel_url: None,
            channel_verified: false,
            channel_follower_count: None,
            channel_description: None,
            duration_seconds: None,
            view_count: None,
            like_count: None,
            upload_date: None,
            description: None,
            thumbnails: Vec::new(),
            formats: Vec::new(),
        }
    }

    #[test]
    fn test_missing_fields_become_placeholders() {
        let info = map_video_info(&bare_raw("dQw4w9WgXcQ"), false);
        assert_eq!(info.title, "Unknown Title");
        assert_eq!(info.duration, "Unknown");
        assert_eq!(info.views, "Unknown");
        assert_eq!(info.likes, "Unknown");
        assert_eq!(info.upload_date, "Unknown");
        assert_eq!(info.description, "");
        assert_eq!(info.channel.name, "Unknown Channel");
        assert_eq!(info.channel.subscribers, "Unknown");
        assert!(!info.channel.verified);
        assert!(info.channel.bio.is_none());
    }

    #[test]
    fn test_full_mapping() {
        let mut raw = bare_raw("dQw4w9WgXcQ");
        raw.title = Some("Never Gonna Give You Up".to_string());
        raw.uploader = Some("Rick Astley".to_string());
        raw.channel_verified = true;
        raw.channel_follower_count = Some(4_200_000);
        raw.duration_seconds = Some(212);
        raw.view_count = Some(1_400_000_000);
        raw.like_count = Some(16_000_000);
        raw.upload_date = Some("20091025".to_string());
        raw.thumbnails = vec![
            "https://i.ytimg.com/vi/x/default.jpg".to_string(),
            "https://i.ytimg.com/vi/x/maxresdefault.jpg".to_string(),
        ];

        let info = map_video_info(&raw, false);
        assert_eq!(info.duration, "3:32");
        assert_eq!(info.views, "1400.0M");
        assert_eq!(info.likes, "16.0M");
        assert_eq!(info.upload_date, "2009-10-25");
        assert_eq!(info.channel.subscribers, "4.2M");
        assert!(info.thumbnail.contains("maxresdefault"));
        assert!(info.channel.verified);
    }

    #[test]
    fn test_thumbnail_preference_order() {
        let thumbs = vec![
            "https://i.ytimg.com/vi/x/mqdefault.jpg".to_string(),
            "https://i.ytimg.com/vi/x/hqdefault.jpg".to_string(),
        ];
        assert!(pick_best_thumbnail(&thumbs).contains("hqdefault"));
        assert_eq!(pick_best_thumbnail(&[]), "");
    }

    #[test]
    fn test_limited_fetch_shape() {
        let fetched = limited_fetch("dQw4w9WgXcQ", true);
        assert!(fetched.limited_info);
        assert!(fetched.note.is_some());
        assert!(fetched.data.video_info.is_short);
        assert_eq!(fetched.data.download_options.len(), 1);
        assert!(fetched.data.video_info.thumbnail.contains("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_upload_date_passthrough_when_not_numeric() {
        assert_eq!(format_upload_date("2009-10-25"), "2009-10-25");
        assert_eq!(format_upload_date("20091025"), "2009-10-25");
    }
}
