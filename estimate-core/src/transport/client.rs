use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::SubmissionPayload;

/// Errors at the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport answered but declined the submission.
    #[error("submission rejected: {}", .0.as_deref().unwrap_or("Submission failed"))]
    Rejected(Option<String>),

    /// The transport could not deliver (network, relay, I/O).
    #[error("transport failed: {0}")]
    Failed(String),

    #[error("transport timed out after {0:?}")]
    TimedOut(Duration),

    #[error("transport configuration error: {0}")]
    Configuration(String),
}

impl TransportError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut(_))
    }
}

/// What a transport reports back for a delivered payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl TransportResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Delivers a submission payload somewhere: an HTTP endpoint, an email
/// relay, an outbox on disk. The controller assumes nothing about the wire
/// format.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError>;
}
