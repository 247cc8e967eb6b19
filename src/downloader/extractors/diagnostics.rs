// Failure diagnostics - classifies raw extractor output
//
// Analyzes error text from the extraction library and the yt-dlp
// subprocesses to determine:
// - Which failure category applies (outdated extractor, unavailable, ...)
// - Whether another backend is worth trying

use serde::{Deserialize, Serialize};

/// Categories of extraction failure surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The extractor no longer matches YouTube's current page/player format.
    /// Typically signature or nsig decryption breaking after a YouTube update.
    ExtractorOutdated,

    /// Video deleted, removed, or otherwise gone.
    VideoUnavailable,

    /// Private, age-gated, members-only, or region-locked content.
    RestrictedOrPrivate,

    /// Timeout or connectivity failure.
    NetworkTimeout,

    /// The requested itag/quality does not exist for this video.
    FormatNotFound,

    /// yt-dlp binary or Python module is not installed.
    ToolMissing,

    /// Anything we could not classify.
    Unknown,
}

impl FailureKind {
    /// Whether trying the next backend in the chain can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExtractorOutdated | Self::NetworkTimeout | Self::ToolMissing | Self::Unknown
        )
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ExtractorOutdated => "Extractor out of date against YouTube",
            Self::VideoUnavailable => "Video unavailable",
            Self::RestrictedOrPrivate => "Video is private or restricted",
            Self::NetworkTimeout => "Network timeout",
            Self::FormatNotFound => "Requested format not found",
            Self::ToolMissing => "Extraction tool not installed",
            Self::Unknown => "Unknown failure",
        }
    }
}

/// Analyze error text and return the failure category.
///
/// Patterns are checked in order of specificity; returns `None` only for
/// empty input.
pub fn diagnose_error(error: &str) -> Option<FailureKind> {
    let lower = error.to_lowercase();

    // Extractor breakage after a YouTube-side update. These are the
    // signatures ytdl-style tools emit when page parsing stops matching.
    if lower.contains("could not extract functions")
        || lower.contains("unable to extract")
        || lower.contains("failed to extract")
        || lower.contains("nsig")
        || lower.contains("signature extraction")
        || lower.contains("decipher")
        || lower.contains("player response")
        || lower.contains("update yt-dlp")
        || lower.contains("this version of yt-dlp")
    {
        return Some(FailureKind::ExtractorOutdated);
    }

    // Format selection misses.
    if lower.contains("requested format is not available")
        || lower.contains("no suitable format")
        || lower.contains("format not found")
    {
        return Some(FailureKind::FormatNotFound);
    }

    // Gone videos.
    if lower.contains("video unavailable")
        || lower.contains("video is unavailable")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
        || lower.contains("410")
    {
        return Some(FailureKind::VideoUnavailable);
    }

    // Access restrictions.
    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("403")
        || lower.contains("forbidden")
        || lower.contains("age-restricted")
        || lower.contains("sign in to confirm")
        || lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("not available in your country")
        || lower.contains("geo")
        || lower.contains("drm")
        || lower.contains("premium")
    {
        return Some(FailureKind::RestrictedOrPrivate);
    }

    // Missing tools.
    if lower.contains("no such file")
        || lower.contains("command not found")
        || lower.contains("not installed")
        || lower.contains("no module named")
    {
        return Some(FailureKind::ToolMissing);
    }

    // Connectivity.
    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("connection reset")
        || lower.contains("network unreachable")
        || lower.contains("dns")
    {
        return Some(FailureKind::NetworkTimeout);
    }

    if !error.is_empty() {
        return Some(FailureKind::Unknown);
    }

    None
}

/// First actionable line of a stderr dump, for log context.
pub fn error_context(error: &str) -> Option<String> {
    error
        .lines()
        .find(|line| {
            let l = line.trim().to_lowercase();
            l.starts_with("error:")
                || l.contains("unavailable")
                || l.contains("forbidden")
                || l.contains("unable to extract")
        })
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_outdated_detection() {
        let error = "Error: Could not extract functions";
        assert_eq!(diagnose_error(error), Some(FailureKind::ExtractorOutdated));
    }

    #[test]
    fn test_nsig_detection() {
        let error = "WARNING: nsig extraction failed: Some formats may be missing";
        assert_eq!(diagnose_error(error), Some(FailureKind::ExtractorOutdated));
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: Video unavailable. This video has been removed by the uploader";
        assert_eq!(diagnose_error(error), Some(FailureKind::VideoUnavailable));
    }

    #[test]
    fn test_private_detection() {
        let error = "ERROR: Private video. Sign in if you've been granted access";
        assert_eq!(
            diagnose_error(error),
            Some(FailureKind::RestrictedOrPrivate)
        );
    }

    #[test]
    fn test_403_detection() {
        let error = "HTTP Error 403: Forbidden";
        assert_eq!(
            diagnose_error(error),
            Some(FailureKind::RestrictedOrPrivate)
        );
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Timed out after 30s";
        assert_eq!(diagnose_error(error), Some(FailureKind::NetworkTimeout));
    }

    #[test]
    fn test_format_detection() {
        let error = "ERROR: Requested format is not available";
        assert_eq!(diagnose_error(error), Some(FailureKind::FormatNotFound));
    }

    #[test]
    fn test_tool_missing_detection() {
        let error = "python3: No module named yt_dlp";
        assert_eq!(diagnose_error(error), Some(FailureKind::ToolMissing));
    }

    #[test]
    fn test_unknown_fallthrough() {
        assert_eq!(diagnose_error("something odd"), Some(FailureKind::Unknown));
        assert_eq!(diagnose_error(""), None);
    }

    #[test]
    fn test_format_checked_before_unavailable() {
        // "not available" alone must not shadow the format category
        let error = "ERROR: Requested format is not available. Use --list-formats";
        assert_eq!(diagnose_error(error), Some(FailureKind::FormatNotFound));
    }

    #[test]
    fn test_retryability() {
        assert!(FailureKind::NetworkTimeout.is_retryable());
        assert!(FailureKind::ExtractorOutdated.is_retryable());
        assert!(!FailureKind::VideoUnavailable.is_retryable());
        assert!(!FailureKind::RestrictedOrPrivate.is_retryable());
    }

    #[test]
    fn test_error_context_picks_error_line() {
        let stderr = "WARNING: something\nERROR: Video unavailable\nmore noise";
        assert_eq!(
            error_context(stderr).as_deref(),
            Some("ERROR: Video unavailable")
        );
    }
}
