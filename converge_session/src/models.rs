use std::fmt::Display;

use chrono::{DateTime, Utc};
use converge::{OperationSequence, OperationStatus};
use serde::{Deserialize, Serialize};

pub type SessionId = String;
pub type Version = u64;

/// An entry of a session's operation log, also published to subscribers.
/// `operation` is the submitted operation after it has been transformed
/// against everything committed since `base_version`, so the log replays in
/// version order without further transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedOperation {
    pub session_id: SessionId,
    pub version: Version,
    pub base_version: Version,
    pub operation: OperationSequence,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    pub status: OperationStatus,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub version: Version,
    pub content: String,
}

/// Where a submission is in the pipeline. Only used for logging: a
/// submission is never observable half way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Received,
    Transforming,
    Committed,
    Rejected,
}

impl Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Received => write!(f, "Received"),
            SubmissionState::Transforming => write!(f, "Transforming"),
            SubmissionState::Committed => write!(f, "Committed"),
            SubmissionState::Rejected => write!(f, "Rejected"),
        }
    }
}
