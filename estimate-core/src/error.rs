use thiserror::Error;

use crate::{staging::StagingError, transport::TransportError, validation::ValidationError};

/// Coarse classification of everything that can go wrong in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyRequired,
    InvalidFormat,
    GroupEmpty,
    Unchecked,
    FileRejected,
    TransportFailure,
    /// Submit was attempted with at least one invalid field.
    Incomplete,
}

/// Umbrella error for the form. None of these are fatal: every one is
/// reported to the user and the form stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    FileRejected(#[from] StagingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{invalid} field(s) need attention before submitting")]
    Incomplete { invalid: usize },
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(ValidationError::EmptyRequired) => ErrorKind::EmptyRequired,
            Self::Validation(ValidationError::InvalidFormat(_)) => ErrorKind::InvalidFormat,
            Self::Validation(ValidationError::GroupEmpty(_)) => ErrorKind::GroupEmpty,
            Self::Validation(ValidationError::Unchecked(_)) => ErrorKind::Unchecked,
            Self::FileRejected(_) => ErrorKind::FileRejected,
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::Incomplete { .. } => ErrorKind::Incomplete,
        }
    }

    /// Text shown to the user for this error.
    ///
    /// Transport details stay in the logs; the user gets a retry hint.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "There was an error submitting your request. Please try again.".to_string()
            }
            Self::Incomplete { .. } => {
                "Please fill in all required fields before submitting.".to_string()
            }
            other => other.to_string(),
        }
    }
}
