mod analytics;
mod client;
pub mod factory;

pub use analytics::{AnalyticsHook, SUBMIT_EVENT, submit_attributes};
pub use client::{SubmissionTransport, TransportError, TransportResponse};
pub use factory::{TransportConfig, TransportFactory, TransportRegistry};
