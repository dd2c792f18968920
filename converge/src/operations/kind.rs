use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of operation kinds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Delete,
    Retain,
    Format,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::Delete => write!(f, "delete"),
            OperationKind::Retain => write!(f, "retain"),
            OperationKind::Format => write!(f, "format"),
        }
    }
}
