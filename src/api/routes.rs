// HTTP surface - validation, metadata, health, and the download stream

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::error::ApiError;
use crate::downloader::utils::build_filename;
use crate::downloader::{
    DownloadFormat, ErrorCategory, FetchedVideo, MediaKind, MetadataFetcher, StreamRelay,
    StreamRequest, VideoData,
};
use crate::validator::{self, BatchValidation, UrlValidation};

#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<MetadataFetcher>,
    relay: Arc<StreamRelay>,
}

impl AppState {
    pub fn new(fetcher: MetadataFetcher, relay: StreamRelay) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            relay: Arc::new(relay),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/validate", post(validate))
        .route("/api/validate/batch", post(validate_batch))
        .route("/api/video-info", get(video_info))
        .route("/api/download", post(download_post).get(download_get))
        .with_state(state)
}

// --- validation -------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    url: String,
    /// When set, also confirm the video exists by fetching its title.
    #[serde(default)]
    verify: bool,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<UrlValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_type: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    let validation = validator::validate_url(&req.url);
    if !validation.is_valid {
        return Json(ValidateResponse {
            success: false,
            error: validation.error.clone(),
            data: Some(validation),
            title: None,
            error_type: None,
            suggestion: Some(
                "Please enter a valid YouTube URL (e.g. https://www.youtube.com/watch?v=...)"
                    .to_string(),
            ),
        });
    }

    let title = if req.verify {
        match state.fetcher.basic_title(&req.url).await {
            Ok(title) => Some(title),
            Err(e) => {
                return Json(ValidateResponse {
                    success: false,
                    data: Some(validation),
                    title: None,
                    error: Some(e.to_string()),
                    error_type: Some(e.category()),
                    suggestion: Some(e.suggestion().to_string()),
                })
            }
        }
    } else {
        None
    };

    Json(ValidateResponse {
        success: true,
        data: Some(validation),
        title,
        error: None,
        error_type: None,
        suggestion: None,
    })
}

#[derive(Debug, Deserialize)]
struct BatchValidateRequest {
    urls: Vec<String>,
}

async fn validate_batch(Json(req): Json<BatchValidateRequest>) -> Json<BatchValidation> {
    Json(validator::validate_many(&req.urls))
}

// --- metadata ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VideoInfoQuery {
    url: String,
}

#[derive(Debug, Serialize)]
struct VideoInfoResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<VideoData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_type: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    is_limited_info: bool,
}

impl VideoInfoResponse {
    fn from_fetched(fetched: FetchedVideo) -> Self {
        Self {
            success: true,
            data: Some(fetched.data),
            error: None,
            error_type: None,
            suggestion: fetched.note,
            is_limited_info: fetched.limited_info,
        }
    }
}

async fn video_info(
    State(state): State<AppState>,
    Query(q): Query<VideoInfoQuery>,
) -> Json<VideoInfoResponse> {
    match state.fetcher.fetch(&q.url).await {
        Ok(fetched) => Json(VideoInfoResponse::from_fetched(fetched)),
        Err(e) => Json(VideoInfoResponse {
            success: false,
            data: None,
            error: Some(e.to_string()),
            error_type: Some(e.category()),
            suggestion: Some(e.suggestion().to_string()),
            is_limited_info: false,
        }),
    }
}

// --- health -----------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    python_available: bool,
    cli_available: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
    timestamp: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let tools = state.fetcher.status();

    let (status, message, suggestion) = if tools.python_available && tools.cli_available {
        ("operational", "Downloader is working normally", None)
    } else if tools.any_available() {
        (
            "degraded",
            "One extraction tool is missing; downloads fall back to the remaining one",
            Some("Install both the yt_dlp Python module and the yt-dlp binary for full coverage."),
        )
    } else {
        (
            "down",
            "No extraction tool is available",
            Some("Install yt-dlp (pip3 install yt-dlp or your package manager)."),
        )
    };

    Json(HealthResponse {
        status,
        python_available: tools.python_available,
        cli_available: tools.cli_available,
        message,
        suggestion,
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    })
}

// --- download ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DownloadRequestBody {
    url: String,
    itag: Option<u32>,
    quality: Option<String>,
    format: Option<String>,
    filename: Option<String>,
    preferred_codec: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    url: Option<String>,
    itag: Option<u32>,
    quality: Option<String>,
    format: Option<String>,
    filename: Option<String>,
    preferred_codec: Option<String>,
    preview: Option<String>,
}

async fn download_post(
    State(state): State<AppState>,
    Json(body): Json<DownloadRequestBody>,
) -> Result<Response, ApiError> {
    handle_download(state, body).await
}

/// GET variant: query parameters instead of a JSON body, plus a preview
/// mode that returns the metadata JSON without streaming anything.
async fn download_get(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let url = q
        .url
        .ok_or_else(|| ApiError::bad_request("URL parameter is required"))?;

    if q.preview.as_deref() == Some("true") {
        let fetched = state.fetcher.fetch(&url).await.map_err(ApiError::from)?;
        return Ok(Json(VideoInfoResponse::from_fetched(fetched)).into_response());
    }

    handle_download(
        state,
        DownloadRequestBody {
            url,
            itag: q.itag,
            quality: q.quality,
            format: q.format,
            filename: q.filename,
            preferred_codec: q.preferred_codec,
        },
    )
    .await
}

async fn handle_download(
    state: AppState,
    body: DownloadRequestBody,
) -> Result<Response, ApiError> {
    if body.url.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let validation = validator::validate_url(&body.url);
    let video_id = match (&validation.video_id, validation.is_valid) {
        (Some(id), true) => id.clone(),
        _ => {
            return Err(ApiError::bad_request(
                validation
                    .error
                    .unwrap_or_else(|| "Invalid YouTube URL".to_string()),
            ))
        }
    };

    let kind = MediaKind::from_param(body.format.as_deref());

    // Metadata drives the attachment filename; a degraded fetch still
    // yields a usable placeholder title.
    let fetched = state.fetcher.fetch(&body.url).await.map_err(ApiError::from)?;
    let video_info = &fetched.data.video_info;

    let extension = select_format(
        &fetched.data.download_options,
        body.itag,
        body.quality.as_deref(),
        kind,
    )
    .map(|f| f.container.extension())
    .unwrap_or(match kind {
        MediaKind::Audio => "m4a",
        MediaKind::Video => "mp4",
    });
    let filename = body.filename.clone().unwrap_or_else(|| {
        build_filename(
            &video_info.title,
            body.quality.as_deref(),
            &video_id,
            extension,
        )
    });

    let request = StreamRequest {
        url: validation
            .normalized_url
            .unwrap_or_else(|| body.url.clone()),
        video_id,
        itag: body.itag,
        quality: body.quality.clone(),
        kind,
    };

    let stream = state.relay.open(&request).await.map_err(ApiError::from)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(kind, body.preferred_codec.as_deref())),
    );
    if let Some(len) = stream.content_length() {
        if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
            headers.insert(CONTENT_LENGTH, value);
        }
    }
    let disposition = content_disposition(&filename);
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|_| ApiError::internal("Could not build download headers"))?,
    );
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let info = serde_json::json!({
        "title": to_ascii(&video_info.title),
        "duration": to_ascii(&video_info.duration),
        "quality": to_ascii(body.quality.as_deref().unwrap_or("default")),
        "format": kind.as_str(),
        "backend": stream.backend(),
    });
    if let Ok(value) = HeaderValue::from_str(&info.to_string()) {
        headers.insert(HeaderName::from_static("x-download-info"), value);
    }

    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Pick the option a request refers to: exact itag match first, then the
/// requested quality within the media kind, then the recommended entry.
fn select_format<'a>(
    options: &'a [DownloadFormat],
    itag: Option<u32>,
    quality: Option<&str>,
    kind: MediaKind,
) -> Option<&'a DownloadFormat> {
    if let Some(itag) = itag {
        if let Some(f) = options.iter().find(|f| f.itag == Some(itag)) {
            return Some(f);
        }
    }

    let candidates: Vec<&DownloadFormat> = options
        .iter()
        .filter(|f| match kind {
            MediaKind::Audio => f.has_audio && !f.has_video,
            MediaKind::Video => f.has_video,
        })
        .collect();

    if let Some(q) = quality {
        if let Some(f) = candidates.iter().find(|f| f.quality.eq_ignore_ascii_case(q)) {
            return Some(*f);
        }
    }

    candidates
        .iter()
        .find(|f| f.recommended)
        .or_else(|| candidates.first())
        .copied()
}

fn content_type_for(kind: MediaKind, codec: Option<&str>) -> &'static str {
    let codec = codec.unwrap_or("");
    match kind {
        MediaKind::Audio => {
            if codec.contains("mp3") {
                "audio/mpeg"
            } else if codec.contains("opus") {
                "audio/webm"
            } else {
                "audio/mp4"
            }
        }
        MediaKind::Video => {
            if codec.contains("vp9") {
                "video/webm"
            } else {
                "video/mp4"
            }
        }
    }
}

// ASCII filename plus an RFC 5987 encoded full name for non-ASCII titles.
fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        to_ascii(filename),
        urlencoding::encode(filename)
    )
}

fn to_ascii(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for(MediaKind::Video, None), "video/mp4");
        assert_eq!(content_type_for(MediaKind::Video, Some("vp9")), "video/webm");
        assert_eq!(content_type_for(MediaKind::Audio, None), "audio/mp4");
        assert_eq!(content_type_for(MediaKind::Audio, Some("mp3")), "audio/mpeg");
        assert_eq!(
            content_type_for(MediaKind::Audio, Some("opus")),
            "audio/webm"
        );
    }

    #[test]
    fn test_content_disposition_is_header_safe() {
        let value = content_disposition("Vidéo \"test\"_dQw4w9WgXcQ.mp4");
        assert!(HeaderValue::from_str(&value).is_ok());
        assert!(value.starts_with("attachment; filename=\""));
        assert!(value.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_select_format() {
        use crate::downloader::FormatContainer;

        let video = DownloadFormat {
            container: FormatContainer::Mp4,
            quality: "720p".to_string(),
            size: "50.00 MB".to_string(),
            itag: Some(22),
            has_audio: true,
            has_video: true,
            recommended: true,
            bitrate: None,
            fps: Some(30.0),
        };
        let audio = DownloadFormat {
            container: FormatContainer::Webm,
            quality: "128kbps".to_string(),
            size: "3.00 MB".to_string(),
            itag: Some(251),
            has_audio: true,
            has_video: false,
            recommended: false,
            bitrate: Some(128.0),
            fps: None,
        };
        let options = vec![video, audio];

        let by_itag = select_format(&options, Some(251), None, MediaKind::Video).unwrap();
        assert_eq!(by_itag.itag, Some(251));

        let by_kind = select_format(&options, None, None, MediaKind::Audio).unwrap();
        assert_eq!(by_kind.container, FormatContainer::Webm);

        let by_quality = select_format(&options, None, Some("720p"), MediaKind::Video).unwrap();
        assert_eq!(by_quality.itag, Some(22));

        assert!(select_format(&[], None, None, MediaKind::Video).is_none());
    }

    #[test]
    fn test_to_ascii_replaces_non_ascii() {
        assert_eq!(to_ascii("abc"), "abc");
        assert_eq!(to_ascii("Vidéo"), "Vid_o");
        assert_eq!(to_ascii("a\"b"), "a_b");
    }
}
