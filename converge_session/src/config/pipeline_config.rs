use core::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BROADCAST_CAPACITY, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_BACKLOG};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Submissions based on a version more than this many commits behind
    /// are rejected instead of transformed.
    #[serde(default = "default_max_backlog")]
    pub max_backlog: usize,

    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// How long a submission may wait for its session before giving up.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl PipelineConfig {
    #[must_use]
    pub fn lock_timeout(&self) -> Duration { Duration::from_millis(self.lock_timeout_ms) }
}

fn default_max_backlog() -> usize {
    debug!("Using default max backlog: {DEFAULT_MAX_BACKLOG}");
    DEFAULT_MAX_BACKLOG
}

fn default_broadcast_capacity() -> usize {
    debug!("Using default broadcast capacity: {DEFAULT_BROADCAST_CAPACITY}");
    DEFAULT_BROADCAST_CAPACITY
}

fn default_lock_timeout_ms() -> u64 {
    debug!("Using default lock timeout (ms): {DEFAULT_LOCK_TIMEOUT_MS}");
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_backlog: default_max_backlog(),
            broadcast_capacity: default_broadcast_capacity(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}
