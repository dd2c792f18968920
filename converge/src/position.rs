use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Operation, char_count,
    transform::range::{map_through_delete, shift_past_insert},
};

/// Pushes a cursor offset through a committed operation. Inserts at or before
/// the offset move it right; an offset inside a deleted range lands on the
/// start of the range.
#[must_use]
pub fn transform_position(offset: usize, operation: &Operation) -> usize {
    match operation {
        Operation::Insert { position, content } => {
            shift_past_insert(offset, *position, char_count(content))
        }
        Operation::Delete { .. } => map_through_delete(offset, &operation.range()),
        Operation::Retain { .. } | Operation::Format { .. } => offset,
    }
}

#[must_use]
pub fn transform_position_through<'a, I>(offset: usize, operations: I) -> usize
where
    I: IntoIterator<Item = &'a Operation>,
{
    operations
        .into_iter()
        .fold(offset, |offset, operation| transform_position(offset, operation))
}

/// Maps a selection through an operation, both ends independently. The end
/// never moves before the start.
#[must_use]
pub fn transform_range(range: Range<usize>, operation: &Operation) -> Range<usize> {
    let start = transform_position(range.start, operation);
    let end = transform_position(range.end, operation);

    start..end.max(start)
}

// CursorPosition is the position of an identifiable cursor in a document
// based on its character index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub id: usize,
    pub char_index: usize,
}

impl CursorPosition {
    #[must_use]
    pub fn new(id: usize, char_index: usize) -> Self { Self { id, char_index } }

    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        CursorPosition {
            id: self.id,
            char_index: index,
        }
    }
}

/// Moves every cursor through `operations`, keeping their ids and order.
#[must_use]
pub fn transform_cursors(cursors: Vec<CursorPosition>, operations: &[Operation]) -> Vec<CursorPosition> {
    cursors
        .into_iter()
        .map(|cursor| {
            let index = transform_position_through(cursor.char_index, operations);
            cursor.with_index(index)
        })
        .collect()
}
