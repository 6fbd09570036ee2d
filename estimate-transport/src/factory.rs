use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use estimate_core::transport::{
    SubmissionTransport, TransportConfig, TransportError, TransportFactory,
};

use crate::{outbox::OutboxTransport, simulated::SimulatedTransport};

/// [`TransportFactory`] for the `"simulated"` backend.
///
/// `target` is the artificial delay in milliseconds; empty means the
/// default of two seconds.
pub struct SimulatedTransportFactory;

#[async_trait]
impl TransportFactory for SimulatedTransportFactory {
    fn backend_name(&self) -> &'static str {
        "simulated"
    }

    async fn create(
        &self,
        config: &TransportConfig,
    ) -> Result<Arc<dyn SubmissionTransport>, TransportError> {
        let target = config.target.trim();
        if target.is_empty() {
            return Ok(Arc::new(SimulatedTransport::default()));
        }

        let millis: u64 = target.parse().map_err(|_| {
            TransportError::Configuration(format!(
                "simulated delay must be a number of milliseconds, got '{target}'"
            ))
        })?;
        Ok(Arc::new(SimulatedTransport::new(Duration::from_millis(millis))))
    }
}

/// [`TransportFactory`] for the `"outbox"` backend.
///
/// `target` is the outbox directory, created if it does not exist.
pub struct OutboxTransportFactory;

#[async_trait]
impl TransportFactory for OutboxTransportFactory {
    fn backend_name(&self) -> &'static str {
        "outbox"
    }

    async fn create(
        &self,
        config: &TransportConfig,
    ) -> Result<Arc<dyn SubmissionTransport>, TransportError> {
        if config.target.trim().is_empty() {
            return Err(TransportError::Configuration(
                "outbox backend needs a target directory".to_string(),
            ));
        }
        let outbox = OutboxTransport::open(config.target.trim()).await?;
        Ok(Arc::new(outbox))
    }
}
