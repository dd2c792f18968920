use std::{collections::HashMap, sync::Arc};

use log::debug;
use tokio::sync::{Mutex, broadcast};

use crate::{
    config::pipeline_config::PipelineConfig,
    models::{CommittedOperation, SessionId},
};

/// One broadcast channel per open session, carrying every committed
/// operation to the session's subscribers.
#[derive(Debug, Clone)]
pub struct Broadcasts {
    capacity: usize,
    tx: Arc<Mutex<HashMap<SessionId, broadcast::Sender<CommittedOperation>>>>,
}

impl Broadcasts {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            capacity: config.broadcast_capacity.max(1),
            tx: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get_or_create(&self, session_id: &str) -> broadcast::Sender<CommittedOperation> {
        let mut tx = self.tx.lock().await;

        tx.entry(session_id.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    pub async fn get(&self, session_id: &str) -> Option<broadcast::Sender<CommittedOperation>> {
        self.tx.lock().await.get(session_id).cloned()
    }

    pub async fn get_receiver(
        &self,
        session_id: &str,
    ) -> Option<broadcast::Receiver<CommittedOperation>> {
        self.get(session_id).await.map(|tx| tx.subscribe())
    }

    /// Drops the session's channel; receivers see it closed once the last
    /// in-flight sender is gone.
    pub async fn remove(&self, session_id: &str) { self.tx.lock().await.remove(session_id); }

    /// Sends a committed operation to all subscribers of its session.
    /// We ignore & log failures.
    pub fn send(tx: &broadcast::Sender<CommittedOperation>, update: CommittedOperation) {
        let version = update.version;

        if let Err(error) = tx.send(update) {
            debug!("Nobody is listening to version {version}: {error}");
        }
    }
}
