use thiserror::Error;

use crate::OperationKind;

/// An operation whose fields do not match the closed field set of its kind.
/// Always caused by the submitting client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Malformed {kind} operation: {reason}")]
    Malformed { kind: OperationKind, reason: String },
}

impl OperationError {
    pub(crate) fn malformed(kind: OperationKind, reason: impl Into<String>) -> Self {
        OperationError::Malformed {
            kind,
            reason: reason.into(),
        }
    }
}

/// Error type for operations that cannot be applied to a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The operation references characters beyond the end of the document
    #[error(
        "Operation at position {position} spanning {length} characters does not fit into a \
         document of {document_length} characters"
    )]
    OutOfBounds {
        /// The position where the operation starts
        position: usize,
        /// The number of characters the operation spans in the existing text
        length: usize,
        /// The length of the document the operation was applied to
        document_length: usize,
    },
}

/// Error type for applying a list of operations one after another.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceApplyError {
    #[error("Failed to apply operation #{index}: {source}")]
    Failed {
        /// Index of the first operation that could not be applied
        index: usize,
        #[source]
        source: ApplyError,
    },
}

impl SequenceApplyError {
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            SequenceApplyError::Failed { index, .. } => *index,
        }
    }

    #[must_use]
    pub fn into_apply_error(self) -> ApplyError {
        match self {
            SequenceApplyError::Failed { source, .. } => source,
        }
    }
}
