//! Concrete submission transports for the estimate form.
//!
//! Each backend comes with a [`TransportFactory`] unit struct;
//! [`register_builtin`] adds all of them to a registry in one call.

mod factory;
mod outbox;
mod simulated;

use estimate_core::transport::TransportRegistry;

pub use factory::{OutboxTransportFactory, SimulatedTransportFactory};
pub use outbox::{OUTBOX_FILE, OutboxTransport};
pub use simulated::{DEFAULT_DELAY, SimulatedTransport};

pub use estimate_core::transport::TransportFactory;

/// Registers every backend shipped with this crate.
pub fn register_builtin(registry: &mut TransportRegistry) {
    registry.register(Box::new(SimulatedTransportFactory));
    registry.register(Box::new(OutboxTransportFactory));
}

/// A registry with every built-in backend already registered.
pub fn builtin_registry() -> TransportRegistry {
    let mut registry = TransportRegistry::new();
    register_builtin(&mut registry);
    registry
}
