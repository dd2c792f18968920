#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle of a submitted operation: `Pending` until the pipeline decides,
/// optionally `Transformed` while its position is adjusted against committed
/// history, then one of the terminal states `Applied` or `Rejected`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationStatus {
    #[default]
    Pending,
    Transformed,
    Applied,
    Rejected,
}

impl OperationStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Applied | OperationStatus::Rejected)
    }
}
