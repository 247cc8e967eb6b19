// Format selection - raw extractor formats into download options
//
// Handles:
// - MP4 video options sorted by resolution, deduplicated by quality label
// - Audio-only options sorted by bitrate
// - Size labels (exact, approximate-from-duration, or "Unknown")
// - quality value -> yt-dlp format spec for the subprocess backends

use std::collections::HashSet;

use super::extractors::RawFormat;
use super::models::{DownloadFormat, FormatContainer, MediaKind, StreamRequest};
use super::utils::format_size;

/// Build the selectable options list. Never returns an empty list: when no
/// usable format survives filtering a single placeholder is emitted.
pub fn build_download_options(
    formats: &[RawFormat],
    duration_seconds: Option<u64>,
) -> Vec<DownloadFormat> {
    let mut options = Vec::new();

    // Video options: MP4 with a known height, highest resolution first.
    let mut video: Vec<&RawFormat> = formats
        .iter()
        .filter(|f| f.has_video() && f.ext == "mp4" && f.height.is_some())
        .collect();
    video.sort_by(|a, b| b.height.cmp(&a.height));

    let mut seen_video = HashSet::new();
    for f in video {
        let quality = format!("{}p", f.height.unwrap_or(0));
        if !seen_video.insert(quality.clone()) {
            continue;
        }
        let recommended = options.is_empty();
        options.push(DownloadFormat {
            container: FormatContainer::Mp4,
            quality,
            size: size_label(f, duration_seconds, MediaKind::Video),
            itag: f.itag(),
            has_audio: f.has_audio(),
            has_video: true,
            recommended,
            bitrate: f.abr,
            fps: f.fps,
        });
    }

    // Audio options: audio-only formats, highest bitrate first.
    let mut audio: Vec<&RawFormat> = formats
        .iter()
        .filter(|f| f.has_audio() && !f.has_video() && f.abr.is_some())
        .collect();
    audio.sort_by(|a, b| {
        b.abr
            .partial_cmp(&a.abr)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen_audio = HashSet::new();
    for f in audio {
        let bitrate = f.abr.unwrap_or(0.0);
        let quality = format!("{}kbps", bitrate.round() as u32);
        if !seen_audio.insert(quality.clone()) {
            continue;
        }
        let container = match f.ext.as_str() {
            "webm" => FormatContainer::Webm,
            "mp4" => FormatContainer::Mp4,
            _ => FormatContainer::M4a,
        };
        options.push(DownloadFormat {
            container,
            quality,
            size: size_label(f, duration_seconds, MediaKind::Audio),
            itag: f.itag(),
            has_audio: true,
            has_video: false,
            recommended: false,
            bitrate: f.abr,
            fps: None,
        });
    }

    if options.is_empty() {
        options.push(DownloadFormat::placeholder());
    }

    options
}

fn size_label(format: &RawFormat, duration_seconds: Option<u64>, kind: MediaKind) -> String {
    if let Some(bytes) = format.effective_size() {
        return format_size(bytes);
    }
    match duration_seconds {
        Some(secs) if secs > 0 => {
            format!("~{}", format_size(estimate_size(secs, format.height, kind)))
        }
        _ => "Unknown".to_string(),
    }
}

/// Heuristic size from duration and typical bitrates, for formats the
/// extractor reports without a length.
pub fn estimate_size(duration_seconds: u64, height: Option<u32>, kind: MediaKind) -> u64 {
    let kbps: u64 = match kind {
        MediaKind::Audio => 160,
        MediaKind::Video => match height {
            Some(h) if h >= 1080 => 5000,
            Some(h) if h >= 720 => 2500,
            Some(h) if h >= 480 => 1000,
            _ => 1500,
        },
    };
    duration_seconds * kbps * 1000 / 8
}

/// Map a stream request onto a yt-dlp `-f` selector.
///
/// Single-format specs only: merged `bv*+ba` outputs need a seekable
/// target and cannot be written to the stdout pipe the relay consumes.
pub fn format_spec(request: &StreamRequest) -> String {
    if let Some(itag) = request.itag {
        return itag.to_string();
    }
    if request.kind == MediaKind::Audio {
        return "ba/b".to_string();
    }
    match request.quality.as_deref() {
        Some("1080p") => "b[height<=1080]/b".to_string(),
        Some("720p") => "b[height<=720]/b".to_string(),
        Some("480p") => "b[height<=480]/b".to_string(),
        Some("360p") => "b[height<=360]/b".to_string(),
        _ => "best".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_format(height: u32, itag: &str, size: Option<u64>) -> RawFormat {
        RawFormat {
            format_id: itag.to_string(),
            ext: "mp4".to_string(),
            width: Some(height * 16 / 9),
            height: Some(height),
            fps: Some(30.0),
            vcodec: Some("avc1.4d401f".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            filesize: size,
            filesize_approx: None,
            tbr: None,
            abr: None,
            format_note: Some(format!("{}p", height)),
        }
    }

    fn audio_format(abr: f32, ext: &str, itag: &str) -> RawFormat {
        RawFormat {
            format_id: itag.to_string(),
            ext: ext.to_string(),
            width: None,
            height: None,
            fps: None,
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            filesize: Some(3_000_000),
            filesize_approx: None,
            tbr: None,
            abr: Some(abr),
            format_note: None,
        }
    }

    #[test]
    fn test_options_sorted_and_recommended() {
        let formats = vec![
            video_format(360, "18", Some(10_000_000)),
            video_format(720, "22", Some(50_000_000)),
            audio_format(128.0, "m4a", "140"),
        ];
        let options = build_download_options(&formats, Some(212));

        assert_eq!(options[0].quality, "720p");
        assert!(options[0].recommended);
        assert_eq!(options[0].itag, Some(22));
        assert_eq!(options[1].quality, "360p");
        assert!(!options[1].recommended);

        let audio = options.last().unwrap();
        assert_eq!(audio.quality, "128kbps");
        assert_eq!(audio.container, FormatContainer::M4a);
        assert!(audio.has_audio && !audio.has_video);
    }

    #[test]
    fn test_duplicate_qualities_deduped() {
        let formats = vec![
            video_format(720, "22", Some(50_000_000)),
            video_format(720, "136", Some(45_000_000)),
            audio_format(128.0, "webm", "251"),
            audio_format(128.0, "m4a", "140"),
        ];
        let options = build_download_options(&formats, None);

        let video_count = options.iter().filter(|o| o.has_video).count();
        let audio_count = options.iter().filter(|o| !o.has_video).count();
        assert_eq!(video_count, 1);
        assert_eq!(audio_count, 1);
        assert_eq!(options.last().unwrap().container, FormatContainer::Webm);
    }

    #[test]
    fn test_empty_formats_produce_placeholder() {
        let options = build_download_options(&[], None);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].quality, "Format info unavailable");
        assert!(options[0].recommended);
    }

    #[test]
    fn test_missing_size_estimated_from_duration() {
        let formats = vec![video_format(720, "22", None)];
        let options = build_download_options(&formats, Some(600));
        // 600s * 2500kbps / 8 = 187_500_000 bytes
        assert!(options[0].size.starts_with('~'));
        assert!(options[0].size.contains("MB"));

        let options = build_download_options(&formats, None);
        assert_eq!(options[0].size, "Unknown");
    }

    #[test]
    fn test_estimate_size_bitrate_table() {
        assert_eq!(
            estimate_size(60, Some(1080), MediaKind::Video),
            60 * 5000 * 1000 / 8
        );
        assert_eq!(
            estimate_size(60, None, MediaKind::Audio),
            60 * 160 * 1000 / 8
        );
    }

    #[test]
    fn test_format_spec_mapping() {
        let mut request = StreamRequest {
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            itag: None,
            quality: None,
            kind: MediaKind::Video,
        };
        assert_eq!(format_spec(&request), "best");

        request.quality = Some("720p".to_string());
        assert_eq!(format_spec(&request), "b[height<=720]/b");

        request.kind = MediaKind::Audio;
        assert_eq!(format_spec(&request), "ba/b");

        request.itag = Some(22);
        assert_eq!(format_spec(&request), "22");
    }
}
