use std::fmt::Display;

use ropey::Rope;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Operation;
use crate::{compose::try_compose, errors::SequenceApplyError};

/// Operations meant to be applied one after another: the position of each
/// operation refers to the document produced by the ones before it.
///
/// Most transforms yield a single operation; a delete that has a concurrent
/// insert land inside it yields two.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationSequence {
    operations: Vec<Operation>,
}

impl OperationSequence {
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self { Self { operations } }

    #[must_use]
    pub fn as_slice(&self) -> &[Operation] { &self.operations }

    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> { self.operations }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> { self.operations.iter() }

    #[must_use]
    pub fn len(&self) -> usize { self.operations.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.operations.is_empty() }

    /// Returns the operation if the sequence consists of exactly one.
    #[must_use]
    pub fn as_single(&self) -> Option<&Operation> {
        match self.operations.as_slice() {
            [operation] => Some(operation),
            _ => None,
        }
    }

    /// Applies every operation to `rope`. Either all of them are applied or,
    /// if one fails, the rope is left as it was.
    ///
    /// # Errors
    ///
    /// Returns the index of the first operation that didn't fit the document.
    pub fn apply_to_rope(&self, rope: &mut Rope) -> Result<(), SequenceApplyError> {
        // ropey clones share their nodes, so staging the edits is cheap
        let mut staged = rope.clone();

        for (index, operation) in self.operations.iter().enumerate() {
            operation
                .apply_to_rope(&mut staged)
                .map_err(|source| SequenceApplyError::Failed { index, source })?;
        }

        *rope = staged;
        Ok(())
    }

    /// Merges neighbouring operations wherever `try_compose` finds a single
    /// equivalent operation. The result edits the text exactly like `self`.
    #[must_use]
    pub fn compacted(&self) -> Self {
        let mut operations: Vec<Operation> = Vec::with_capacity(self.operations.len());

        for operation in &self.operations {
            let merged = operations
                .last()
                .and_then(|previous| try_compose(previous, operation));

            match merged {
                Some(merged) => {
                    operations.pop();
                    operations.push(merged);
                }
                None => operations.push(operation.clone()),
            }
        }

        Self::new(operations)
    }
}

impl From<Operation> for OperationSequence {
    fn from(operation: Operation) -> Self { Self::new(vec![operation]) }
}

impl From<Vec<Operation>> for OperationSequence {
    fn from(operations: Vec<Operation>) -> Self { Self::new(operations) }
}

impl FromIterator<Operation> for OperationSequence {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for OperationSequence {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter { self.operations.into_iter() }
}

impl<'a> IntoIterator for &'a OperationSequence {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter { self.operations.iter() }
}

impl Display for OperationSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operations = self
            .operations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "[{operations}]")
    }
}
