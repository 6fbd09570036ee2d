use std::time::Duration;

use async_trait::async_trait;
use estimate_core::{
    models::SubmissionPayload,
    transport::{SubmissionTransport, TransportError, TransportResponse},
};
use tracing::{debug, info};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// Stand-in for a real endpoint: waits, logs what it would have sent and
/// reports success.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl SubmissionTransport for SimulatedTransport {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        tokio::time::sleep(self.delay).await;

        for (key, value) in &payload.fields {
            debug!(key = %key, value = %value, "simulated field");
        }
        for file in &payload.files {
            debug!(
                key = %file.key,
                name = %file.attachment.name,
                size = file.attachment.size_bytes,
                "simulated photo"
            );
        }
        info!(
            fields = payload.fields.len(),
            photos = payload.files.len(),
            delay_ms = self.delay.as_millis() as u64,
            "simulated submission accepted"
        );

        Ok(TransportResponse::accepted())
    }
}
