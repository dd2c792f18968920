use core::time::Duration;

use converge::{ApplyError, OperationError, SequenceApplyError};
use log::{info, warn};
use thiserror::Error;

use crate::models::{SessionId, SubmissionState, Version};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{0}")]
    Malformed(#[from] OperationError),

    #[error("Transformed operation cannot be applied: {0}")]
    OutOfBounds(#[from] ApplyError),

    #[error(
        "Session `{session_id}` has {backlog} operations after version {base_version}, more \
         than the limit of {limit}"
    )]
    TooManyConcurrentOperations {
        session_id: SessionId,
        base_version: Version,
        backlog: usize,
        limit: usize,
    },

    #[error(
        "Base version {base_version} is ahead of version {document_version} of session \
         `{session_id}`"
    )]
    FutureBaseVersion {
        session_id: SessionId,
        base_version: Version,
        document_version: Version,
    },

    #[error("Session `{0}` not found")]
    SessionNotFound(SessionId),

    #[error("Session `{0}` has ended")]
    SessionEnded(SessionId),

    #[error("Invalid history for session `{session_id}`: {reason}")]
    InvalidHistory { session_id: SessionId, reason: String },

    #[error("Timed out after {timeout:?} waiting for session `{session_id}`")]
    Timeout {
        session_id: SessionId,
        timeout: Duration,
    },
}

impl PipelineError {
    /// Whether the submitter caused the error. Other errors point at a
    /// defect or at an overloaded session.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Malformed(_)
            | Self::TooManyConcurrentOperations { .. }
            | Self::FutureBaseVersion { .. }
            | Self::SessionNotFound(_)
            | Self::SessionEnded(_) => true,
            Self::OutOfBounds(_) | Self::InvalidHistory { .. } | Self::Timeout { .. } => false,
        }
    }
}

impl From<SequenceApplyError> for PipelineError {
    fn from(error: SequenceApplyError) -> Self { Self::OutOfBounds(error.into_apply_error()) }
}

pub fn rejected(error: PipelineError) -> PipelineError {
    if error.is_client_error() {
        info!("{}: {error}", SubmissionState::Rejected);
    } else {
        warn!("{}: {error}", SubmissionState::Rejected);
    }

    error
}
