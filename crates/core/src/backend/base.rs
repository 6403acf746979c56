//! Base Backend trait and supporting types.

use async_trait::async_trait;
use prd_protocol::GenerationRequest;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// One incremental chunk delivered by the backend, already tagged as
/// reasoning or final-answer content at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A fragment of the final answer.
    Text(String),

    /// A fragment of the model's intermediate reasoning.
    Reasoning(String),
}

/// Error markers that indicate a failure likely to succeed on retry.
///
/// Matching is plain substring search over the error text. Backend error
/// text is not a stable contract, so this list is a heuristic starting
/// point rather than a complete classification.
const TRANSIENT_MARKERS: [&str; 6] = [
    "503",
    "429",
    "overloaded",
    "UNAVAILABLE",
    "RESOURCE_EXHAUSTED",
    "rate limit",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend not available: {0}")]
    NotAvailable(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("API call failed: {0}")]
    Api(String),

    #[error("Stream parsing error: {0}")]
    StreamParse(String),
}

impl BackendError {
    /// Whether this failure matches one of the transient-error markers.
    pub fn is_transient(&self) -> bool {
        let text = self.to_string();
        TRANSIENT_MARKERS
            .iter()
            .any(|marker| text.contains(marker))
    }
}

/// A finite, non-restartable sequence of tagged fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, BackendError>> + Send>>;

/// Adapter over the hosted LLM service.
///
/// `issue` opens one streaming generation call; each call creates a fresh
/// stream. The backend does not support resuming mid-stream, so a retried
/// call redelivers all fragments from the beginning.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn check_availability(&self) -> bool;

    async fn issue(&self, request: &GenerationRequest) -> Result<FragmentStream, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Api("HTTP 503 Service Unavailable".to_string()).is_transient());
        assert!(BackendError::Api("429 Too Many Requests".to_string()).is_transient());
        assert!(BackendError::Api("model is overloaded".to_string()).is_transient());
        assert!(BackendError::Api("RESOURCE_EXHAUSTED: quota".to_string()).is_transient());
        assert!(BackendError::Connect("rate limit exceeded".to_string()).is_transient());
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!BackendError::Api("invalid API key".to_string()).is_transient());
        assert!(!BackendError::StreamParse("bad JSON".to_string()).is_transient());
        // Marker matching is case-sensitive, mirroring the backend's
        // error-code casing.
        assert!(!BackendError::Api("resource_exhausted".to_string()).is_transient());
    }
}
