// Shared stdout-streaming subprocess plumbing for the yt-dlp backends

use std::process::Stdio;

use futures::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio_util::io::ReaderStream;

use crate::downloader::errors::DownloadError;
use crate::downloader::extractors::diagnostics::error_context;
use crate::downloader::stream::{chunk_channel, PendingStream, PumpGuard};

const READ_CAPACITY: usize = 64 * 1024;

/// Spawn `program args...` with media on stdout and pump it into a stream
/// handle. The child is spawned kill-on-drop: aborting the pump (client
/// disconnect, relay moving on) kills the process.
pub(super) fn spawn_streaming(
    backend: &'static str,
    program: &str,
    args: Vec<String>,
) -> Result<PendingStream, DownloadError> {
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

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("No stdout from {}", program)))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("No stderr from {}", program)))?;

    let (tx, rx) = chunk_channel();
    let handle = tokio::spawn(async move {
        // stderr drains concurrently so the child never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).to_string()
        });

        let mut produced = false;
        let mut reader = ReaderStream::with_capacity(stdout, READ_CAPACITY);
        while let Some(item) = reader.next().await {
            match item {
                Ok(chunk) => {
                    produced = true;
                    if tx.send(Ok(chunk)).await.is_err() {
                        // consumer gone; dropping the child kills it
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx
                        .send(Err(DownloadError::ExecutionError(format!(
                            "{} read error: {}",
                            backend, e
                        ))))
                        .await;
                    return;
                }
            }
        }

        // stdout closed; surface abnormal exits instead of truncating silently
        let status = child.wait().await;
        let stderr_text = stderr_task.await.unwrap_or_default();
        match status {
            Ok(s) if s.success() => {
                tracing::debug!(backend, "subprocess finished");
            }
            Ok(s) => {
                let detail = if stderr_text.trim().is_empty() {
                    format!("{} exited with {}", backend, s)
                } else {
                    stderr_text
                };
                if produced {
                    let context = error_context(&detail).unwrap_or_default();
                    tracing::warn!(backend, %context, "subprocess failed mid-transfer");
                }
                let _ = tx.send(Err(DownloadError::from(detail))).await;
            }
            Err(e) => {
                let _ = tx
                    .send(Err(DownloadError::ExecutionError(format!(
                        "{} wait failed: {}",
                        backend, e
                    ))))
                    .await;
            }
        }
    });

    Ok(PendingStream::new(backend, None, rx, PumpGuard::new(handle)))
}
