// Byte-stream plumbing between backends and the HTTP response
//
// A backend spawns a pump task that feeds chunks into a bounded channel
// (backpressure: the pump waits when the consumer is slow). The consumer
// side is a `MediaStream` the response body polls. Dropping the handle at
// any point aborts the pump, which drops the upstream resource - child
// processes are spawned kill-on-drop, HTTP responses close on drop.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;
use super::progress::ProgressTracker;

/// Chunk channel depth. Bounds buffered memory per request.
pub const CHANNEL_CAPACITY: usize = 16;

pub type ChunkSender = mpsc::Sender<Result<Bytes, DownloadError>>;
pub type ChunkReceiver = mpsc::Receiver<Result<Bytes, DownloadError>>;

pub fn chunk_channel() -> (ChunkSender, ChunkReceiver) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Aborts the pump task when the consumer goes away. `Drop` runs exactly
/// once, so upstream teardown cannot double-fire.
#[derive(Debug)]
pub struct PumpGuard {
    handle: JoinHandle<()>,
}

impl PumpGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for PumpGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A backend attempt whose pump is running but has not produced data yet.
#[derive(Debug)]
pub struct PendingStream {
    backend: &'static str,
    content_length: Option<u64>,
    rx: ChunkReceiver,
    guard: PumpGuard,
}

impl PendingStream {
    pub fn new(
        backend: &'static str,
        content_length: Option<u64>,
        rx: ChunkReceiver,
        guard: PumpGuard,
    ) -> Self {
        Self {
            backend,
            content_length,
            rx,
            guard,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Race the first chunk against a deadline. On success the attempt
    /// becomes a flowing [`MediaStream`]; on any failure the caller drops
    /// the handle and the guard tears the attempt down.
    pub async fn first_chunk(mut self, deadline: Duration) -> Result<MediaStream, DownloadError> {
        match timeout(deadline, self.rx.recv()).await {
            Ok(Some(Ok(chunk))) => Ok(MediaStream {
                backend: self.backend,
                content_length: self.content_length,
                first: Some(chunk),
                rx: self.rx,
                progress: ProgressTracker::new(self.content_length),
                finished: false,
                _guard: self.guard,
            }),
            Ok(Some(Err(e))) => Err(e),
            Ok(None) => Err(DownloadError::ExecutionError(format!(
                "{} ended before producing data",
                self.backend
            ))),
            Err(_) => Err(DownloadError::NetworkTimeout),
        }
    }
}

/// The chosen source, bridged onto a poll-based byte stream.
///
/// Chunks forward as they arrive, upstream end closes the stream, upstream
/// errors surface as stream errors, and dropping the stream (client abort)
/// releases the backend resource via the pump guard.
#[derive(Debug)]
pub struct MediaStream {
    backend: &'static str,
    content_length: Option<u64>,
    first: Option<Bytes>,
    rx: ChunkReceiver,
    progress: ProgressTracker,
    finished: bool,
    _guard: PumpGuard,
}

impl MediaStream {
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

impl Stream for MediaStream {
    type Item = Result<Bytes, DownloadError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(chunk) = this.first.take() {
            this.progress.record(chunk.len() as u64);
            return Poll::Ready(Some(Ok(chunk)));
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.progress.record(chunk.len() as u64);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                tracing::warn!(backend = this.backend, error = %e, "stream failed mid-transfer");
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !this.finished {
                    this.finished = true;
                    let snap = this.progress.snapshot();
                    tracing::info!(
                        backend = this.backend,
                        bytes = snap.transferred_bytes,
                        elapsed_ms = this.progress.elapsed().as_millis() as u64,
                        rate_bps = snap.bytes_per_second as u64,
                        "stream complete"
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
