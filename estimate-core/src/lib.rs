pub mod controller;
pub mod error;
pub mod models;
pub mod staging;
pub mod transport;
pub mod validation;

pub use controller::{
    ControllerOptions, EstimateFormController, FormEvent, FormView, Response, SubmitOutcome,
    SubmitPolicy,
};
pub use error::{ErrorKind, FormError};
