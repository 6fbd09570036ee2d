use std::time::Duration;

use super::navigation::{NavigationState, Progress};
use crate::{
    error::{ErrorKind, FormError},
    models::AttachmentId,
    staging::Preview,
};

/// How long a transient notice stays up before dismissing itself.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

pub const SUBMIT_LABEL: &str = "Submit Estimate Request";
pub const BUSY_LABEL: &str = "Submitting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, auto-dismissing message shown at the top of the active step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub dismiss_after: Duration,
}

impl Notice {
    pub fn error(err: &FormError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message(),
            kind: Some(err.kind()),
            dismiss_after: NOTICE_TTL,
        }
    }
}

/// State of the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub enabled: bool,
}

impl SubmitControl {
    pub fn idle() -> Self {
        Self {
            label: SUBMIT_LABEL,
            enabled: true,
        }
    }

    pub fn busy() -> Self {
        Self {
            label: BUSY_LABEL,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropZoneState {
    /// A drag is hovering over the zone.
    pub highlighted: bool,
    /// The attachment limit is reached.
    pub full: bool,
}

/// The page surface the controller renders into.
///
/// Implementations decide how each call maps to real widgets. Calls are
/// idempotent: showing an error for a field replaces the previous one.
pub trait FormView {
    fn show_step(
        &mut self,
        step: usize,
        title: &str,
    );
    fn focus_field(
        &mut self,
        field: &str,
    );
    fn render_progress(
        &mut self,
        progress: &Progress,
    );
    fn render_navigation(
        &mut self,
        navigation: &NavigationState,
    );
    /// Writes a reformatted value back into its control.
    fn set_field_value(
        &mut self,
        field: &str,
        value: &str,
    );
    fn set_field_visible(
        &mut self,
        field: &str,
        visible: bool,
    );
    fn show_field_error(
        &mut self,
        field: &str,
        message: &str,
    );
    fn clear_field_error(
        &mut self,
        field: &str,
    );
    fn show_notice(
        &mut self,
        notice: &Notice,
    );
    fn add_preview_card(
        &mut self,
        card: &Preview,
    );
    fn fill_preview_card(
        &mut self,
        card: &Preview,
    );
    fn remove_preview_card(
        &mut self,
        id: AttachmentId,
    );
    fn render_drop_zone(
        &mut self,
        state: DropZoneState,
    );
    fn render_submit_control(
        &mut self,
        control: &SubmitControl,
    );
    /// Hides the form and brings the success confirmation into view.
    fn show_confirmation(&mut self);
}
