use core::fmt::{Debug, Display};
use std::ops::Range;

use ropey::Rope;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Attributes, OperationKind};
use crate::errors::ApplyError;

/// An atomic edit of a plain-text document. Positions and lengths are
/// character offsets into the document the operation was generated against.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[cfg_attr(feature = "serde", serde(try_from = "crate::OperationPayload"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert {
        position: usize,
        content: String,
    },

    Delete {
        position: usize,
        length: usize,
    },

    /// Marks a range without changing the text. A zero-length retain is the
    /// canonical no-op.
    Retain {
        position: usize,
        length: usize,
    },

    Format {
        position: usize,
        length: usize,
        attributes: Attributes,
    },
}

impl Operation {
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Operation::Insert {
            position,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn delete(position: usize, length: usize) -> Self { Operation::Delete { position, length } }

    #[must_use]
    pub fn retain(position: usize, length: usize) -> Self { Operation::Retain { position, length } }

    #[must_use]
    pub fn format(position: usize, length: usize, attributes: Attributes) -> Self {
        Operation::Format {
            position,
            length,
            attributes,
        }
    }

    /// The operation that changes nothing. Transforms produce it when a
    /// concurrent edit fully consumes an operation.
    #[must_use]
    pub fn noop(position: usize) -> Self { Operation::retain(position, 0) }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert { .. } => OperationKind::Insert,
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::Retain { .. } => OperationKind::Retain,
            Operation::Format { .. } => OperationKind::Format,
        }
    }

    /// Returns the index of the first character that the operation affects.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Operation::Insert { position, .. }
            | Operation::Delete { position, .. }
            | Operation::Retain { position, .. }
            | Operation::Format { position, .. } => *position,
        }
    }

    /// Returns the number of characters the operation spans in the document
    /// it is applied to. Inserts span nothing of the existing text.
    #[must_use]
    pub fn span(&self) -> usize {
        match self {
            Operation::Insert { .. } => 0,
            Operation::Delete { length, .. }
            | Operation::Retain { length, .. }
            | Operation::Format { length, .. } => *length,
        }
    }

    /// Returns the range of existing characters that the operation touches.
    /// The end saturates at `usize::MAX`; such ranges never fit a document.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.position()..self.position().saturating_add(self.span())
    }

    /// True when applying the operation can't change the document or its
    /// formatting.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Operation::Insert { content, .. } => content.is_empty(),
            Operation::Delete { length, .. } | Operation::Format { length, .. } => *length == 0,
            Operation::Retain { .. } => true,
        }
    }

    /// Creates a new operation with the same kind and payload but with the
    /// given position.
    #[must_use]
    pub fn with_position(self, position: usize) -> Self {
        match self {
            Operation::Insert { content, .. } => Operation::Insert { position, content },
            Operation::Delete { length, .. } => Operation::Delete { position, length },
            Operation::Retain { length, .. } => Operation::Retain { position, length },
            Operation::Format {
                length, attributes, ..
            } => Operation::Format {
                position,
                length,
                attributes,
            },
        }
    }

    /// Applies the operation to `rope` in place. The bounds are checked
    /// before anything is mutated, so on error the rope is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ApplyError::OutOfBounds` if the operation references
    /// characters past the end of the document.
    pub fn apply_to_rope(&self, rope: &mut Rope) -> Result<(), ApplyError> {
        self.check_bounds(rope.len_chars())?;

        match self {
            Operation::Insert { position, content } => rope.insert(*position, content),
            Operation::Delete { position, length } => rope.remove(*position..*position + *length),
            Operation::Retain { .. } | Operation::Format { .. } => {}
        }

        Ok(())
    }

    /// Checks that the characters the operation touches exist in a document
    /// of `document_length` characters.
    pub(crate) fn check_bounds(&self, document_length: usize) -> Result<(), ApplyError> {
        let end = self.position().checked_add(self.span());

        if end.is_none_or(|end| end > document_length) {
            return Err(ApplyError::OutOfBounds {
                position: self.position(),
                length: self.span(),
                document_length,
            });
        }

        Ok(())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Operation::Insert { position, content } => {
                write!(
                    f,
                    "<insert '{}' at {position}>",
                    content.replace('\n', "\\n")
                )
            }
            Operation::Delete { position, length } => {
                write!(f, "<delete {length} characters from {position}>")
            }
            Operation::Retain { position, length } => {
                write!(f, "<retain {length} characters from {position}>")
            }
            Operation::Format {
                position,
                length,
                attributes,
            } => {
                let attributes = attributes
                    .iter()
                    .map(|(key, value)| match value {
                        Some(value) => format!("{key}={value}"),
                        None => format!("{key}=null"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(
                    f,
                    "<format {length} characters from {position} with {{{attributes}}}>"
                )
            }
        }
    }
}
