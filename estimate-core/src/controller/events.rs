use crate::{
    models::{AttachmentId, DroppedFile, PickedFile},
    staging::StagingReport,
    validation::ValidationResult,
};

use super::submit::SubmitOutcome;

/// Every UI event the controller reacts to.
#[derive(Debug, Clone)]
pub enum FormEvent {
    /// A text, select, date or radio value changed.
    Input { field: String, value: String },
    /// A checkbox was toggled. `option` names the box inside a checkbox
    /// group and is `None` for a single checkbox.
    Toggle {
        field: String,
        option: Option<String>,
        checked: bool,
    },
    Blur { field: String },
    Next,
    Previous,
    DragEnter,
    DragLeave,
    FilesDropped(Vec<DroppedFile>),
    FilesPicked(Vec<PickedFile>),
    RemoveFile(AttachmentId),
    Submit,
}

impl FormEvent {
    pub fn input(
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Input {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn blur(field: impl Into<String>) -> Self {
        Self::Blur {
            field: field.into(),
        }
    }

    pub fn check(field: impl Into<String>) -> Self {
        Self::Toggle {
            field: field.into(),
            option: None,
            checked: true,
        }
    }

    pub fn toggle_option(
        field: impl Into<String>,
        option: impl Into<String>,
        checked: bool,
    ) -> Self {
        Self::Toggle {
            field: field.into(),
            option: Some(option.into()),
            checked,
        }
    }
}

/// What handling an event did.
#[derive(Debug)]
pub enum Response {
    /// The event did not apply (unknown field, form already submitted).
    Ignored,
    /// The value was stored without running validation.
    Updated,
    Validated(ValidationResult),
    Step { moved: bool, current: usize },
    Staged(StagingReport),
    Removed(bool),
    Submitted(SubmitOutcome),
}
