use chrono::Utc;
use converge::{OperationSequence, OperationStatus, Side, transform_sequences};
use log::{debug, warn};
use ropey::Rope;

use crate::{
    errors::PipelineError,
    models::{CommittedOperation, DocumentSnapshot, SessionId, Version},
};

/// The state of one session: the append-only operation log and the document
/// it materializes. The document version is the length of the log, so the
/// two can't advance separately.
#[derive(Debug)]
pub struct SessionState {
    session_id: SessionId,
    document: Rope,
    log: Vec<CommittedOperation>,
    ended: bool,
}

impl SessionState {
    pub fn new(session_id: SessionId, initial_content: &str) -> Self {
        Self {
            session_id,
            document: Rope::from_str(initial_content),
            log: Vec::new(),
            ended: false,
        }
    }

    /// Rebuilds a session from a persisted log by replaying it on top of
    /// `initial_content`.
    pub fn restore(
        session_id: SessionId,
        initial_content: &str,
        log: Vec<CommittedOperation>,
    ) -> Result<Self, PipelineError> {
        let mut state = Self::new(session_id, initial_content);

        for entry in log {
            let expected_version = state.document_version() + 1;
            let invalid = |reason: String| PipelineError::InvalidHistory {
                session_id: state.session_id.clone(),
                reason,
            };

            if entry.session_id != state.session_id {
                return Err(invalid(format!(
                    "version {} belongs to session `{}`",
                    entry.version, entry.session_id
                )));
            }
            if entry.version != expected_version {
                return Err(invalid(format!(
                    "expected version {expected_version} but found {}",
                    entry.version
                )));
            }
            if entry.base_version >= entry.version {
                return Err(invalid(format!(
                    "version {} is based on the later version {}",
                    entry.version, entry.base_version
                )));
            }
            if entry.status == OperationStatus::Rejected {
                return Err(invalid(format!("version {} was rejected", entry.version)));
            }
            if !entry.status.is_terminal() && entry.status != OperationStatus::Transformed {
                return Err(invalid(format!(
                    "version {} was never applied",
                    entry.version
                )));
            }
            if let Err(error) = entry.operation.apply_to_rope(&mut state.document) {
                return Err(invalid(format!("version {}: {error}", entry.version)));
            }

            state.log.push(entry);
        }

        Ok(state)
    }

    pub fn document_version(&self) -> Version { self.log.len() as Version }

    pub fn is_ended(&self) -> bool { self.ended }

    pub fn end(&mut self) { self.ended = true; }

    /// Committed entries with a version greater than `version`, in order.
    pub fn operations_since(&self, version: Version) -> &[CommittedOperation] {
        let start = usize::try_from(version)
            .unwrap_or(usize::MAX)
            .min(self.log.len());

        &self.log[start..]
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            version: self.document_version(),
            content: self.document.to_string(),
        }
    }

    /// Transforms `incoming`, generated against `base_version`, against
    /// every operation committed since. Committed operations win position
    /// ties since they were accepted first.
    pub fn rebase(
        &self,
        incoming: OperationSequence,
        base_version: Version,
        max_backlog: usize,
    ) -> Result<OperationSequence, PipelineError> {
        let document_version = self.document_version();

        if base_version > document_version {
            return Err(PipelineError::FutureBaseVersion {
                session_id: self.session_id.clone(),
                base_version,
                document_version,
            });
        }

        let committed = self.operations_since(base_version);
        if committed.len() > max_backlog {
            return Err(PipelineError::TooManyConcurrentOperations {
                session_id: self.session_id.clone(),
                base_version,
                backlog: committed.len(),
                limit: max_backlog,
            });
        }
        if committed.len() > max_backlog - max_backlog / 4 {
            warn!(
                "Submission to session `{}` is {} operations behind, close to the limit of \
                 {max_backlog}",
                self.session_id,
                committed.len()
            );
        }

        Ok(committed.iter().fold(incoming, |incoming, entry| {
            transform_sequences(&incoming, &entry.operation, Side::Right).left
        }))
    }

    /// Applies `operation` to the document and appends it to the log as the
    /// next version. Nothing changes if the operation doesn't fit.
    pub fn commit(
        &mut self,
        operation: OperationSequence,
        base_version: Version,
        author: Option<String>,
        client_id: Option<String>,
    ) -> Result<CommittedOperation, PipelineError> {
        operation.apply_to_rope(&mut self.document)?;

        let entry = CommittedOperation {
            session_id: self.session_id.clone(),
            version: self.document_version() + 1,
            base_version,
            operation,
            author,
            client_id,
            status: OperationStatus::Applied,
            committed_at: Utc::now(),
        };
        debug!(
            "Committed {} as version {} of session `{}`",
            entry.operation, entry.version, self.session_id
        );

        self.log.push(entry.clone());
        Ok(entry)
    }
}
