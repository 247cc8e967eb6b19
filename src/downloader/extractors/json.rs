// --dump-json parsing shared by the Python and CLI extractors

use crate::downloader::errors::DownloadError;

use super::traits::{RawFormat, RawVideoInfo};

/// Parse one `yt-dlp --dump-json` document into raw video info.
pub fn parse_dump_json(stdout: &[u8]) -> Result<RawVideoInfo, DownloadError> {
    let json_str = String::from_utf8_lossy(stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

    let id = json["id"]
        .as_str()
        .ok_or_else(|| DownloadError::ParseError("Missing video id in JSON".to_string()))?
        .to_string();

    let mut thumbnails: Vec<String> = json["thumbnails"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t["url"].as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();
    if let Some(best) = json["thumbnail"].as_str() {
        thumbnails.push(best.to_string());
    }

    Ok(RawVideoInfo {
        id,
        title: json["title"].as_str().map(|s| s.to_string()),
        uploader: json["uploader"]
            .as_str()
            .or_else(|| json["channel"].as_str())
            .map(|s| s.to_string()),
        channel_url: json["channel_url"]
            .as_str()
            .or_else(|| json["uploader_url"].as_str())
            .map(|s| s.to_string()),
        channel_verified: json["channel_is_verified"].as_bool().unwrap_or(false),
        channel_follower_count: json["channel_follower_count"].as_u64(),
        channel_description: json["channel_description"].as_str().map(|s| s.to_string()),
        duration_seconds: json["duration"].as_f64().map(|d| d as u64),
        view_count: json["view_count"].as_u64(),
        like_count: json["like_count"].as_u64(),
        upload_date: json["upload_date"].as_str().map(|s| s.to_string()),
        description: json["description"].as_str().map(|s| s.to_string()),
        thumbnails,
        formats: parse_formats(&json),
    })
}

fn parse_formats(json: &serde_json::Value) -> Vec<RawFormat> {
    let formats_array = match json["formats"].as_array() {
        Some(f) => f,
        None => return Vec::new(),
    };

    formats_array
        .iter()
        .map(|f| RawFormat {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            ext: f["ext"].as_str().unwrap_or("").to_string(),
            width: f["width"].as_u64().map(|w| w as u32),
            height: f["height"].as_u64().map(|h| h as u32),
            fps: f["fps"].as_f64().map(|v| v as f32),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            filesize: f["filesize"].as_u64(),
            filesize_approx: f["filesize_approx"].as_u64(),
            tbr: f["tbr"].as_f64().map(|v| v as f32),
            abr: f["abr"].as_f64().map(|v| v as f32),
            format_note: f["format_note"].as_str().map(|s| s.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let doc = serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "uploader": "Rick Astley",
            "channel_url": "https://www.youtube.com/@RickAstley",
            "channel_is_verified": true,
            "channel_follower_count": 4_200_000u64,
            "duration": 212.0,
            "view_count": 1_400_000_000u64,
            "like_count": 16_000_000u64,
            "upload_date": "20091025",
            "description": "classic",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "thumbnails": [
                {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg"},
                {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"}
            ],
            "formats": [
                {"format_id": "18", "ext": "mp4", "height": 360, "vcodec": "avc1", "acodec": "mp4a", "filesize": 10_000_000u64},
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5, "filesize_approx": 3_400_000u64}
            ]
        });
        let raw = parse_dump_json(serde_json::to_vec(&doc).unwrap().as_slice()).unwrap();

        assert_eq!(raw.id, "dQw4w9WgXcQ");
        assert_eq!(raw.title.as_deref(), Some("Never Gonna Give You Up"));
        assert!(raw.channel_verified);
        assert_eq!(raw.duration_seconds, Some(212));
        assert_eq!(raw.thumbnails.len(), 3);
        assert_eq!(raw.formats.len(), 2);
        assert_eq!(raw.formats[0].itag(), Some(18));
        assert!(raw.formats[1].has_audio());
        assert!(!raw.formats[1].has_video());
    }

    #[test]
    fn test_parse_minimal_document() {
        let raw = parse_dump_json(br#"{"id": "abc123DEF-_"}"#).unwrap();
        assert_eq!(raw.id, "abc123DEF-_");
        assert!(raw.title.is_none());
        assert!(raw.formats.is_empty());
        assert!(raw.thumbnails.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_dump_json(b"not json"),
            Err(DownloadError::ParseError(_))
        ));
        assert!(matches!(
            parse_dump_json(b"{}"),
            Err(DownloadError::ParseError(_))
        ));
    }
}
