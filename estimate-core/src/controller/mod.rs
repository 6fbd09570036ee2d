//! The estimate form controller and the surface it renders into.

mod events;
mod form;
mod navigation;
mod state;
mod submit;
mod view;

pub use events::{FormEvent, Response};
pub use form::{ControllerOptions, EstimateFormController, Phase};
pub use navigation::{NavigationState, Progress, StepMarker};
pub use state::FormState;
pub use submit::{SubmitOutcome, SubmitPolicy, deliver};
pub use view::{
    BUSY_LABEL, DropZoneState, FormView, NOTICE_TTL, Notice, NoticeLevel, SUBMIT_LABEL,
    SubmitControl,
};
