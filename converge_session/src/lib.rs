//! The stateful side of collaborative editing: every session keeps an
//! append-only log of committed operations and the document it produces.
//! Operations submitted against an older version are transformed against
//! everything committed since, then committed as the next version and
//! published to the session's subscribers.

mod broadcasts;
pub mod config;
pub mod consts;
mod errors;
mod models;
mod pipeline;
mod session;

pub use config::{Config, pipeline_config::PipelineConfig};
pub use errors::PipelineError;
pub use models::{CommittedOperation, DocumentSnapshot, SessionId, SubmissionState, Version};
pub use pipeline::Pipeline;
