// Stream relay - ordered fallback over the stream backends
//
// One supervising loop owns the per-attempt policy: a uniform deadline
// around "handshake + first chunk", and cleanup-on-abandon (dropping the
// attempt's handle aborts its pump and releases the upstream resource).
// Backends never implement their own timeout logic.

use tokio::time::{timeout, Duration};

use super::backends::{CliStreamBackend, LibraryBackend, PythonStreamBackend};
use super::errors::DownloadError;
use super::extractors::diagnostics::diagnose_error;
use super::models::StreamRequest;
use super::stream::MediaStream;
use super::traits::StreamBackend;

pub struct StreamRelay {
    backends: Vec<Box<dyn StreamBackend>>,
    attempt_timeout: Duration,
}

impl StreamRelay {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            backends: Vec::new(),
            attempt_timeout,
        }
    }

    /// Production chain: extraction library, Python yt-dlp, native yt-dlp.
    pub fn with_default_backends(attempt_timeout: Duration) -> Self {
        let mut relay = Self::new(attempt_timeout);
        relay.add_backend(Box::new(LibraryBackend::new()));
        relay.add_backend(Box::new(PythonStreamBackend::new()));
        relay.add_backend(Box::new(CliStreamBackend::new()));
        relay
    }

    pub fn add_backend(&mut self, backend: Box<dyn StreamBackend>) {
        self.backends.push(backend);
    }

    /// Try each backend in order until one produces data.
    ///
    /// An attempt that errors, stays silent past the deadline, or is
    /// unavailable is recorded and abandoned; exhaustion of the list fails
    /// with the aggregated attempt log.
    pub async fn open(&self, request: &StreamRequest) -> Result<MediaStream, DownloadError> {
        let mut attempts: Vec<String> = Vec::new();

        for backend in &self.backends {
            if !backend.is_available() {
                tracing::debug!(backend = backend.name(), "skipped: not available");
                attempts.push(format!("{}: not available", backend.name()));
                continue;
            }

            tracing::info!(backend = backend.name(), video = %request.video_id, "trying backend");

            let attempt = async {
                let pending = backend.open(request).await?;
                pending.first_chunk(self.attempt_timeout).await
            };

            match timeout(self.attempt_timeout, attempt).await {
                Ok(Ok(stream)) => {
                    tracing::info!(backend = backend.name(), "bytes flowing");
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    match diagnose_error(&e.to_string()) {
                        Some(kind) => tracing::warn!(
                            backend = backend.name(),
                            error = %e,
                            kind = kind.description(),
                            retryable = kind.is_retryable(),
                            "attempt failed"
                        ),
                        None => {
                            tracing::warn!(backend = backend.name(), error = %e, "attempt failed")
                        }
                    }
                    attempts.push(format!("{}: {}", backend.name(), e));
                }
                Err(_) => {
                    // dropping the attempt future tears the backend down
                    tracing::warn!(backend = backend.name(), "no data before deadline");
                    attempts.push(format!("{}: no data before deadline", backend.name()));
                }
            }
        }

        Err(DownloadError::AllBackendsFailed(attempts))
    }
}
