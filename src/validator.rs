// YouTube URL validation and video id extraction

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Recognized shapes: watch?v=, /shorts/, /embed/, /v/, youtu.be/,
    // with optional scheme and www./m. subdomains, plus trailing params.
    static ref YOUTUBE_URL_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[&?][A-Za-z0-9_=&-]*)?$"
    ).unwrap();

    // Looser domain check used to distinguish "not YouTube at all" from
    // "YouTube URL we could not parse".
    static ref YOUTUBE_DOMAIN_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com|youtu\.be)/.+$"
    ).unwrap();

    static ref SHORTS_RE: Regex = Regex::new(r"/shorts/[A-Za-z0-9_-]{11}").unwrap();

    // Fallback id patterns for URLs the anchored regex rejects
    // (extra path segments, unusual parameter order).
    static ref ID_FALLBACK_RES: Vec<Regex> = vec![
        Regex::new(r"[?&]v=([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"/embed/([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"/v/([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"/shorts/([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"youtu\.be/([A-Za-z0-9_-]{11})").unwrap(),
    ];
}

/// Structured result of validating one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlValidation {
    pub is_valid: bool,
    pub video_id: Option<String>,
    pub is_short: bool,
    pub original_url: Option<String>,
    pub normalized_url: Option<String>,
    pub error: Option<String>,
}

impl UrlValidation {
    fn invalid(error: &str) -> Self {
        Self {
            is_valid: false,
            video_id: None,
            is_short: false,
            original_url: None,
            normalized_url: None,
            error: Some(error.to_string()),
        }
    }
}

/// Summary over a batch of validations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValidation {
    pub results: Vec<UrlValidation>,
    pub summary: BatchSummary,
}

/// Extract the 11-character video id from any recognized URL shape.
pub fn extract_video_id(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = YOUTUBE_URL_RE.captures(trimmed) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    for re in ID_FALLBACK_RES.iter() {
        if let Some(caps) = re.captures(trimmed) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    None
}

/// Whether the URL points at a YouTube Short.
pub fn is_short_url(url: &str) -> bool {
    SHORTS_RE.is_match(url.trim())
}

/// Validate a YouTube URL and derive its canonical form.
///
/// Pure function: no I/O, no failure modes beyond "no match". Every invalid
/// input carries a non-empty error message.
pub fn validate_url(url: &str) -> UrlValidation {
    let trimmed = url.trim();

    if trimmed.is_empty() {
        return UrlValidation::invalid("URL cannot be empty");
    }

    if !YOUTUBE_DOMAIN_RE.is_match(trimmed) {
        return UrlValidation::invalid("Please enter a valid YouTube URL");
    }

    let video_id = match extract_video_id(trimmed) {
        Some(id) => id,
        None => return UrlValidation::invalid("Could not extract video ID from URL"),
    };

    let is_short = is_short_url(trimmed);
    let normalized_url = if is_short {
        format!("https://www.youtube.com/shorts/{}", video_id)
    } else {
        format!("https://www.youtube.com/watch?v={}", video_id)
    };

    UrlValidation {
        is_valid: true,
        video_id: Some(video_id),
        is_short,
        original_url: Some(trimmed.to_string()),
        normalized_url: Some(normalized_url),
        error: None,
    }
}

/// Validate a list of URLs and summarize the outcome.
pub fn validate_many(urls: &[String]) -> BatchValidation {
    let results: Vec<UrlValidation> = urls.iter().map(|u| validate_url(u)).collect();
    let valid = results.iter().filter(|r| r.is_valid).count();
    let summary = BatchSummary {
        total: results.len(),
        valid,
        invalid: results.len() - valid,
    };

    BatchValidation { results, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_watch_url() {
        let v = validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(!v.is_short);
        assert_eq!(
            v.normalized_url.as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_short_link() {
        let v = validate_url("https://youtu.be/dQw4w9WgXcQ");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(!v.is_short);
        assert_eq!(
            v.normalized_url.as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_shorts_url() {
        let v = validate_url("https://www.youtube.com/shorts/abc123DEF-_");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("abc123DEF-_"));
        assert!(v.is_short);
        assert_eq!(
            v.normalized_url.as_deref(),
            Some("https://www.youtube.com/shorts/abc123DEF-_")
        );
    }

    #[test]
    fn test_embed_url() {
        let v = validate_url("https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(!v.is_short);
    }

    #[test]
    fn test_mobile_subdomain() {
        let v = validate_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_no_scheme_no_www() {
        let v = validate_url("youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_trailing_params() {
        let v = validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s");
        assert!(v.is_valid);
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_fallback_param_order() {
        // feature param first; anchored regex misses, fallback catches ?v=
        let id = extract_video_id("https://www.youtube.com/watch?feature=shared&v=dQw4w9WgXcQ");
        assert_eq!(id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_empty_url() {
        let v = validate_url("   ");
        assert!(!v.is_valid);
        assert!(!v.error.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn test_non_youtube_domain() {
        let v = validate_url("https://vimeo.com/12345678");
        assert!(!v.is_valid);
        assert!(!v.error.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn test_youtube_domain_without_id() {
        let v = validate_url("https://www.youtube.com/feed/trending");
        assert!(!v.is_valid);
        assert_eq!(
            v.error.as_deref(),
            Some("Could not extract video ID from URL")
        );
    }

    #[test]
    fn test_id_must_be_eleven_chars() {
        assert!(extract_video_id("https://youtu.be/tooShort").is_none());
        assert!(!validate_url("https://youtu.be/tooShort").is_valid);
    }

    #[test]
    fn test_batch_summary() {
        let urls = vec![
            "https://youtu.be/dQw4w9WgXcQ".to_string(),
            "https://example.com/x".to_string(),
            "https://www.youtube.com/shorts/abc123DEF-_".to_string(),
        ];
        let batch = validate_many(&urls);
        assert_eq!(batch.summary.total, 3);
        assert_eq!(batch.summary.valid, 2);
        assert_eq!(batch.summary.invalid, 1);
        assert!(!batch.results[1].is_valid);
    }
}
