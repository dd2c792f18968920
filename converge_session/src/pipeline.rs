use std::{collections::HashMap, sync::Arc};

use converge::{Operation, OperationPayload, OperationSequence};
use log::{debug, info};
use tokio::sync::{Mutex, MutexGuard, broadcast};
use tracing::{Instrument as _, info_span};

use crate::{
    broadcasts::Broadcasts,
    config::pipeline_config::PipelineConfig,
    errors::{PipelineError, rejected},
    models::{CommittedOperation, DocumentSnapshot, SessionId, SubmissionState, Version},
    session::SessionState,
};

/// Accepts operations for any number of sessions. Submissions to one session
/// are transformed and committed one at a time, in arrival order;
/// submissions to different sessions never wait for each other.
///
/// Cloning is cheap and every clone refers to the same sessions.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    broadcasts: Broadcasts,
    sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<SessionState>>>>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            config: config.clone(),
            broadcasts: Broadcasts::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a session with `initial_content` at version 0. Returns `false`
    /// and leaves the session alone if it is already open.
    pub async fn open_session(&self, session_id: &str, initial_content: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(session_id) {
            debug!("Session `{session_id}` is already open");
            return false;
        }

        self.broadcasts.get_or_create(session_id).await;
        sessions.insert(
            session_id.to_owned(),
            Arc::new(Mutex::new(SessionState::new(
                session_id.to_owned(),
                initial_content,
            ))),
        );
        info!("Opened session `{session_id}`");

        true
    }

    /// Opens a session from a persisted log. Returns `false` if the session
    /// is already open.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidHistory` if the log isn't a contiguous
    /// run of versions from 1 that applies to `initial_content`.
    pub async fn restore_session(
        &self,
        session_id: &str,
        initial_content: &str,
        log: Vec<CommittedOperation>,
    ) -> Result<bool, PipelineError> {
        let state = SessionState::restore(session_id.to_owned(), initial_content, log)?;

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(session_id) {
            debug!("Session `{session_id}` is already open, not restoring it");
            return Ok(false);
        }

        self.broadcasts.get_or_create(session_id).await;
        info!(
            "Restored session `{session_id}` at version {}",
            state.document_version()
        );
        sessions.insert(session_id.to_owned(), Arc::new(Mutex::new(state)));

        Ok(true)
    }

    /// Stops accepting operations for the session. The log stays readable.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::SessionNotFound` for unknown sessions and
    /// `PipelineError::Timeout` if the session stays busy for too long.
    pub async fn end_session(&self, session_id: &str) -> Result<(), PipelineError> {
        let session = self.session(session_id).await?;
        let mut state = self.lock(session_id, &session).await?;

        if !state.is_ended() {
            state.end();
            self.broadcasts.remove(session_id).await;
            info!("Ended session `{session_id}`");
        }

        Ok(())
    }

    /// Transforms `payload`, generated against `base_version` of the
    /// session, against everything committed since and commits it as the
    /// next version. Subscribers receive the committed operation before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Fails without committing anything if the payload is malformed, the
    /// session is unknown or ended, the base version is ahead of the
    /// session or too far behind it, the transformed operation doesn't fit
    /// the document, or the session stays busy past the lock timeout.
    pub async fn submit_operation(
        &self,
        session_id: &str,
        base_version: Version,
        payload: OperationPayload,
    ) -> Result<CommittedOperation, PipelineError> {
        let span = info_span!(
            "submit_operation",
            session_id,
            base_version,
            kind = %payload.kind
        );

        self.submit(session_id, base_version, payload)
            .instrument(span)
            .await
            .map_err(rejected)
    }

    async fn submit(
        &self,
        session_id: &str,
        base_version: Version,
        payload: OperationPayload,
    ) -> Result<CommittedOperation, PipelineError> {
        debug!(
            "{} operation based on version {base_version}",
            SubmissionState::Received
        );
        let incoming = OperationSequence::from(Operation::try_from(&payload)?);

        let session = self.session(session_id).await?;
        let updates = self.broadcasts.get(session_id).await;
        let mut state = self.lock(session_id, &session).await?;

        if state.is_ended() {
            return Err(PipelineError::SessionEnded(session_id.to_owned()));
        }

        debug!(
            "{} {incoming} against versions {base_version}..{}",
            SubmissionState::Transforming,
            state.document_version()
        );
        let transformed = state.rebase(incoming, base_version, self.config.max_backlog)?;

        let committed = state.commit(
            transformed,
            base_version,
            payload.author,
            payload.client_id,
        )?;
        debug!(
            "{} as version {}",
            SubmissionState::Committed,
            committed.version
        );

        // sent while the session is locked so subscribers see versions in order
        if let Some(updates) = updates {
            Broadcasts::send(&updates, committed.clone());
        }

        Ok(committed)
    }

    /// Committed operations with a version greater than `version`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::SessionNotFound` for unknown sessions and
    /// `PipelineError::Timeout` if the session stays busy for too long.
    pub async fn operations_since(
        &self,
        session_id: &str,
        version: Version,
    ) -> Result<Vec<CommittedOperation>, PipelineError> {
        let session = self.session(session_id).await?;
        let state = self.lock(session_id, &session).await?;

        Ok(state.operations_since(version).to_vec())
    }

    /// # Errors
    ///
    /// Returns `PipelineError::SessionNotFound` for unknown sessions and
    /// `PipelineError::Timeout` if the session stays busy for too long.
    pub async fn snapshot(&self, session_id: &str) -> Result<DocumentSnapshot, PipelineError> {
        let session = self.session(session_id).await?;
        let state = self.lock(session_id, &session).await?;

        Ok(state.snapshot())
    }

    /// # Errors
    ///
    /// Returns `PipelineError::SessionNotFound` for unknown sessions and
    /// `PipelineError::Timeout` if the session stays busy for too long.
    pub async fn document_version(&self, session_id: &str) -> Result<Version, PipelineError> {
        let session = self.session(session_id).await?;
        let state = self.lock(session_id, &session).await?;

        Ok(state.document_version())
    }

    /// Receives every operation committed to the session from now on.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::SessionNotFound` for unknown sessions and
    /// `PipelineError::SessionEnded` once the session has ended.
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<CommittedOperation>, PipelineError> {
        // fails early for unknown sessions
        self.session(session_id).await?;

        self.broadcasts
            .get_receiver(session_id)
            .await
            .ok_or_else(|| PipelineError::SessionEnded(session_id.to_owned()))
    }

    async fn session(&self, session_id: &str) -> Result<Arc<Mutex<SessionState>>, PipelineError> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| PipelineError::SessionNotFound(session_id.to_owned()))
    }

    async fn lock<'a>(
        &self,
        session_id: &str,
        session: &'a Mutex<SessionState>,
    ) -> Result<MutexGuard<'a, SessionState>, PipelineError> {
        let timeout = self.config.lock_timeout();

        tokio::time::timeout(timeout, session.lock())
            .await
            .map_err(|_| PipelineError::Timeout {
                session_id: session_id.to_owned(),
                timeout,
            })
    }
}
