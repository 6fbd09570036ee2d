use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use super::client::{SubmissionTransport, TransportError};

/// Backend-agnostic transport configuration.
///
/// `backend` must match the [`TransportFactory::backend_name`] of a
/// registered factory. `target` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend     | target examples                    |
/// |-------------|------------------------------------|
/// | `simulated` | `2000` (delay in ms), empty        |
/// | `outbox`    | `./outbox`, `/var/spool/estimates` |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"simulated"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub target: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            backend: "simulated".to_string(),
            target: String::new(),
        }
    }
}

/// One implementation per transport backend. Each backend exports a unit
/// struct implementing this trait, registered with a [`TransportRegistry`]
/// at startup.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Build a ready-to-use transport. Implementations may create
    /// directories or open connections here.
    async fn create(
        &self,
        config: &TransportConfig,
    ) -> Result<Arc<dyn SubmissionTransport>, TransportError>;
}

/// Registry of [`TransportFactory`] instances, keyed by backend name.
pub struct TransportRegistry {
    factories: HashMap<&'static str, Box<dyn TransportFactory>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn TransportFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`TransportError::Configuration`] when no factory is registered
    ///   for the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &TransportConfig,
    ) -> Result<Arc<dyn SubmissionTransport>, TransportError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                TransportError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
