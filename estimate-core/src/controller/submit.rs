use std::time::Duration;

use tracing::{info, warn};

use crate::{
    models::SubmissionPayload,
    transport::{SubmissionTransport, TransportError, TransportResponse},
};

/// Timeout and retry policy around the transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Upper bound for one transport call.
    pub timeout: Duration,
    /// Total attempts, including the first. `0` behaves like `1`.
    pub max_attempts: u32,
    /// Wait before the second attempt, doubled for each one after.
    pub backoff: Duration,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation failed; the listed fields show inline errors.
    Invalid { fields: Vec<String> },
    Failed(TransportError),
    /// The form was already submitted.
    Ignored,
}

/// Calls the transport under `policy`.
///
/// A `success: false` response becomes [`TransportError::Rejected`] and is
/// never retried; failures and timeouts are retried until attempts run out.
pub async fn deliver(
    transport: &dyn SubmissionTransport,
    payload: &SubmissionPayload,
    policy: SubmitPolicy,
) -> Result<TransportResponse, TransportError> {
    let attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff;
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(policy.timeout, transport.submit(payload)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::TimedOut(policy.timeout)),
        };

        match result {
            Ok(response) if response.success => {
                info!(attempt, "submission accepted");
                return Ok(response);
            }
            Ok(response) => return Err(TransportError::Rejected(response.message)),
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!(attempt, of = attempts, ?backoff, "submission attempt failed: {err}");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
