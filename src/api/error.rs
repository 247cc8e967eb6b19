// API error envelope - maps the download taxonomy onto HTTP responses

use axum::http::{header::RETRY_AFTER, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::downloader::{DownloadError, ErrorCategory};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub category: Option<ErrorCategory>,
    pub suggestion: Option<String>,
    pub retry_after_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_type: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            category: None,
            suggestion: None,
            retry_after_seconds: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            category: None,
            suggestion: None,
            retry_after_seconds: None,
        }
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        let (status, retry_after_seconds) = match &err {
            DownloadError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, None),
            DownloadError::FormatNotFound(_) => (StatusCode::NOT_FOUND, None),
            DownloadError::Unavailable(_) => (StatusCode::GONE, None),
            DownloadError::Restricted(_) => (StatusCode::FORBIDDEN, None),
            DownloadError::NetworkTimeout => (StatusCode::REQUEST_TIMEOUT, None),
            DownloadError::ExtractorOutdated(_) | DownloadError::ToolNotFound(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, Some(300))
            }
            DownloadError::ParseError(_)
            | DownloadError::ExecutionError(_)
            | DownloadError::AllBackendsFailed(_)
            | DownloadError::Unknown(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        Self {
            status,
            message: err.to_string(),
            category: Some(err.category()),
            suggestion: Some(err.suggestion().to_string()),
            retry_after_seconds,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_type: self.category,
            suggestion: self.suggestion,
            retry_after_seconds: self.retry_after_seconds,
        });

        let mut response = (self.status, body).into_response();
        if let Some(seconds) = self.retry_after_seconds {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                DownloadError::InvalidUrl("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DownloadError::Unavailable("x".into()),
                StatusCode::GONE,
            ),
            (
                DownloadError::Restricted("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (DownloadError::NetworkTimeout, StatusCode::REQUEST_TIMEOUT),
            (
                DownloadError::FormatNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                DownloadError::ExtractorOutdated("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DownloadError::AllBackendsFailed(vec![]),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_outdated_extractor_advertises_retry() {
        let api_err = ApiError::from(DownloadError::ExtractorOutdated("x".into()));
        assert_eq!(api_err.retry_after_seconds, Some(300));

        let response = api_err.into_response();
        assert!(response.headers().contains_key(RETRY_AFTER));
    }

    #[test]
    fn test_suggestion_carried() {
        let api_err = ApiError::from(DownloadError::NetworkTimeout);
        assert!(api_err.suggestion.unwrap().contains("connection"));
    }
}
