// Helper functions shared by extractors and stream backends

use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;

/// Run a command to completion with a deadline, capturing stdout/stderr.
/// The child is killed if the deadline elapses.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DownloadError::ToolNotFound(program.to_string())
            } else {
                DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e))
            }
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("No stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("No stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf).await;
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        buf
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status_res) => {
            let status = status_res.map_err(|e| {
                DownloadError::ExecutionError(format!("Failed to wait for {}: {}", program, e))
            })?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::NetworkTimeout)
        }
    }
}

/// Locate the yt-dlp binary: explicit env override first, then common
/// install locations, then whatever PATH resolves.
pub fn find_ytdlp() -> String {
    if let Ok(path) = std::env::var("YTDLP_PATH") {
        if !path.trim().is_empty() {
            return path;
        }
    }

    let common_paths = [
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/opt/homebrew/bin/yt-dlp",
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    "yt-dlp".to_string()
}

/// Python interpreter used for the `yt_dlp` module backend.
/// Override with YTDLP_PYTHON (e.g. a venv interpreter).
pub fn python_cmd() -> String {
    std::env::var("YTDLP_PYTHON").unwrap_or_else(|_| "python3".to_string())
}

/// Quick availability probe for a Python module.
pub fn python_has_module(module: &str) -> bool {
    let code = format!("import {}", module);
    match std::process::Command::new(python_cmd())
        .args(["-c", &code])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

/// Seconds -> "H:MM:SS" or "M:SS" display string.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Compact count string: 1_234_567 -> "1.2M", 12_345 -> "12.3K".
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Byte count -> "B"/"KB"/"MB"/"GB" display string.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Make a title safe for a Content-Disposition filename: drop specials,
/// collapse whitespace to underscores, cap the length.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '.' | '-'))
        .collect();

    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");

    // Collapse runs left over from stripped characters.
    let mut collapsed = String::with_capacity(joined.len());
    let mut prev_underscore = false;
    for c in joined.chars() {
        if c == '_' {
            if !prev_underscore {
                collapsed.push(c);
            }
            prev_underscore = true;
        } else {
            collapsed.push(c);
            prev_underscore = false;
        }
    }

    let capped: String = collapsed.chars().take(100).collect();
    let trimmed = capped.trim_matches('_').to_string();

    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed
    }
}

/// Download filename: sanitized title, optional quality tag, video id,
/// extension for the container.
pub fn build_filename(
    title: &str,
    quality: Option<&str>,
    video_id: &str,
    extension: &str,
) -> String {
    let base = sanitize_filename(title);
    match quality {
        Some(q) if !q.is_empty() => format!("{}_{}_{}.{}", base, q, video_id, extension),
        _ => format!("{}_{}.{}", base, video_id, extension),
    }
}
