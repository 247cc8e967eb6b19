// Common data models for the downloader

use serde::{Deserialize, Serialize};

/// Channel sub-object of [`VideoInfo`]. Every field is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    pub avatar: String,
    pub subscribers: String,
    pub verified: bool,
    pub bio: Option<String>,
    pub channel_url: Option<String>,
}

impl ChannelInfo {
    pub fn unknown() -> Self {
        Self {
            name: "Unknown Channel".to_string(),
            avatar: String::new(),
            subscribers: "Unknown".to_string(),
            verified: false,
            bio: None,
            channel_url: None,
        }
    }
}

/// Display-oriented video metadata, derived per request and discarded
/// after the response. Missing upstream data degrades to placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub duration: String,
    pub views: String,
    pub likes: String,
    pub upload_date: String,
    pub description: String,
    pub is_short: bool,
    pub channel: ChannelInfo,
}

impl VideoInfo {
    /// Degraded metadata built from the video id alone, used when the
    /// extractor is out of date and full details cannot be fetched.
    pub fn placeholder(video_id: &str) -> Self {
        Self {
            id: video_id.to_string(),
            title: "Video information temporarily unavailable".to_string(),
            thumbnail: format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id),
            duration: "Unknown".to_string(),
            views: "Unknown".to_string(),
            likes: "Unknown".to_string(),
            upload_date: "Unknown".to_string(),
            description: "Video details are temporarily unavailable due to YouTube updates."
                .to_string(),
            is_short: false,
            channel: ChannelInfo::unknown(),
        }
    }
}

/// Container type of a download option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatContainer {
    Mp4,
    Webm,
    Mp3,
    M4a,
}

impl FormatContainer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Webm => "WEBM",
            Self::Mp3 => "MP3",
            Self::M4a => "M4A",
        }
    }

    /// File extension used for generated filenames.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }
}

/// One selectable download option. Lifetime: one request/response cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadFormat {
    pub container: FormatContainer,
    pub quality: String,
    pub size: String,
    pub itag: Option<u32>,
    pub has_audio: bool,
    pub has_video: bool,
    pub recommended: bool,
    pub bitrate: Option<f32>,
    pub fps: Option<f32>,
}

impl DownloadFormat {
    /// Single fallback entry emitted when no usable format survives
    /// filtering, so the options list is never empty.
    pub fn placeholder() -> Self {
        Self {
            container: FormatContainer::Mp4,
            quality: "Format info unavailable".to_string(),
            size: "Unknown".to_string(),
            itag: None,
            has_audio: true,
            has_video: true,
            recommended: true,
            bitrate: None,
            fps: None,
        }
    }
}

/// Whether the client asked for the full video or an audio-only stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Parse the request parameter; anything but "audio" means video.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.eq_ignore_ascii_case("audio") => Self::Audio,
            _ => Self::Video,
        }
    }
}

/// What a stream backend is asked to produce.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub url: String,
    pub video_id: String,
    pub itag: Option<u32>,
    pub quality: Option<String>,
    pub kind: MediaKind,
}
