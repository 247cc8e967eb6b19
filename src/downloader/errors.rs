// Error types for extraction and streaming backends

use std::fmt;

use serde::{Deserialize, Serialize};

use super::extractors::diagnostics::{diagnose_error, FailureKind};

#[derive(Debug, Clone)]
pub enum DownloadError {
    /// The extraction library/tool is out of date against YouTube's
    /// current page format (signature/nsig breakage).
    ExtractorOutdated(String),

    /// Video deleted, removed, or otherwise gone.
    Unavailable(String),

    /// Private, age-gated, or region-locked content.
    Restricted(String),

    /// Network timeout or connectivity failure.
    NetworkTimeout,

    /// The requested itag/quality does not exist for this video.
    FormatNotFound(String),

    /// Input was not a usable YouTube URL.
    InvalidUrl(String),

    /// yt-dlp binary or Python module missing from the system.
    ToolNotFound(String),

    /// Extractor produced output we could not parse.
    ParseError(String),

    /// Subprocess failed to spawn or exited abnormally.
    ExecutionError(String),

    /// Every backend in the fallback chain failed; carries one entry
    /// per attempt ("backend: reason").
    AllBackendsFailed(Vec<String>),

    /// Unknown error with details.
    Unknown(String),
}

/// User-facing error category carried in API envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    ExtractorOutdated,
    Unavailable,
    Restricted,
    Network,
    FormatNotFound,
    Unknown,
}

impl DownloadError {
    /// Collapse the error into the user-facing taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ExtractorOutdated(_) | Self::ToolNotFound(_) => ErrorCategory::ExtractorOutdated,
            Self::Unavailable(_) => ErrorCategory::Unavailable,
            Self::Restricted(_) => ErrorCategory::Restricted,
            Self::NetworkTimeout => ErrorCategory::Network,
            Self::FormatNotFound(_) => ErrorCategory::FormatNotFound,
            Self::InvalidUrl(_)
            | Self::ParseError(_)
            | Self::ExecutionError(_)
            | Self::AllBackendsFailed(_)
            | Self::Unknown(_) => ErrorCategory::Unknown,
        }
    }

    /// User-facing suggestion matching the category.
    pub fn suggestion(&self) -> &'static str {
        if let Self::ToolNotFound(_) = self {
            return "Install yt-dlp (pip3 install yt-dlp or your package manager) and restart the service.";
        }
        match self.category() {
            ErrorCategory::ExtractorOutdated => {
                "YouTube has updated their system. Try again in a few hours or update yt-dlp."
            }
            ErrorCategory::Unavailable => {
                "This video may be deleted or set to private. Try a different video."
            }
            ErrorCategory::Restricted => {
                "Try accessing the video directly on YouTube first, or try a different video."
            }
            ErrorCategory::Network => "Check your internet connection and try again.",
            ErrorCategory::FormatNotFound => "Pick a different quality or format and try again.",
            ErrorCategory::Unknown => {
                "This may be due to temporary YouTube issues. Try again in a few minutes."
            }
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtractorOutdated(msg) => {
                write!(f, "Extractor out of date against YouTube: {}", msg)
            }
            Self::Unavailable(msg) => write!(f, "Video unavailable: {}", msg),
            Self::Restricted(msg) => write!(f, "Video is private or restricted: {}", msg),
            Self::NetworkTimeout => write!(f, "Network timeout: YouTube is not responding"),
            Self::FormatNotFound(msg) => write!(f, "Requested format not found: {}", msg),
            Self::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            Self::AllBackendsFailed(attempts) => {
                write!(f, "All backends failed: {}", attempts.join("; "))
            }
            Self::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

// Classify raw tool/library error text into the taxonomy.
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        match diagnose_error(&s) {
            Some(FailureKind::ExtractorOutdated) => Self::ExtractorOutdated(s),
            Some(FailureKind::VideoUnavailable) => Self::Unavailable(s),
            Some(FailureKind::RestrictedOrPrivate) => Self::Restricted(s),
            Some(FailureKind::NetworkTimeout) => Self::NetworkTimeout,
            Some(FailureKind::FormatNotFound) => Self::FormatNotFound(s),
            Some(FailureKind::ToolMissing) => Self::ToolNotFound(s),
            Some(FailureKind::Unknown) | None => Self::Unknown(s),
        }
    }
}
