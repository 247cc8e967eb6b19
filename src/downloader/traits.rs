// Stream backend trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::StreamRequest;
use super::stream::PendingStream;

/// Trait for media stream backends.
///
/// A backend starts producing bytes for a request and hands back a pending
/// handle; the relay owns the per-attempt timeout and teardown policy.
#[async_trait]
pub trait StreamBackend: Send + Sync {
    /// Name of the backend (for logging and attempt reports).
    fn name(&self) -> &'static str;

    /// Whether this backend is usable on this host.
    fn is_available(&self) -> bool {
        true
    }

    /// Spawn the pump for this request. No data has flowed yet when this
    /// returns; the relay races the first chunk against its deadline.
    async fn open(&self, request: &StreamRequest) -> Result<PendingStream, DownloadError>;
}
