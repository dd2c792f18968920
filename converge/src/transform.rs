pub(crate) mod range;
mod sequence;

use range::{map_through_delete, range_past_insert, range_through_delete};
pub use sequence::transform_sequences;

use crate::{Operation, OperationSequence, Side, char_count};

/// The two halves of a transform: `left` is the first operation rewritten to
/// apply after the second one, `right` is the second operation rewritten to
/// apply after the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub left: OperationSequence,
    pub right: OperationSequence,
}

/// Transforms two operations generated against the same document so that
/// either order of application converges:
///
/// `apply(apply(doc, left), result.right) == apply(apply(doc, right), result.left)`
///
/// `priority` decides which insert goes first when both land on the same
/// position. Every pair yields a single operation per side, except for a
/// delete that has the other insert land strictly inside it: the delete is
/// then split in two so that the inserted content survives.
///
/// ```
/// use converge::{Operation, Side, transform};
///
/// let result = transform(
///     &Operation::insert(2, "XX"),
///     &Operation::delete(6, 5),
///     Side::Left,
/// );
///
/// assert_eq!(result.right.as_single(), Some(&Operation::delete(8, 5)));
/// ```
#[must_use]
pub fn transform(left: &Operation, right: &Operation, priority: Side) -> TransformResult {
    TransformResult {
        left: transform_against(left, right, priority == Side::Left),
        right: transform_against(right, left, priority.opposite() == Side::Left),
    }
}

/// Rewrites `operation` so that it can be applied after `applied`. When both
/// are inserts at the same position, `goes_first` keeps `operation` in front.
fn transform_against(operation: &Operation, applied: &Operation, goes_first: bool) -> OperationSequence {
    match (operation, applied) {
        (_, Operation::Retain { .. } | Operation::Format { .. }) => operation.clone().into(),

        (
            Operation::Insert { position, .. },
            Operation::Insert {
                position: at,
                content,
            },
        ) => {
            if position < at || (position == at && goes_first) {
                operation.clone().into()
            } else {
                operation
                    .clone()
                    .with_position(position.saturating_add(char_count(content)))
                    .into()
            }
        }

        (
            Operation::Delete { position, length },
            Operation::Insert {
                position: at,
                content,
            },
        ) => {
            let inserted = char_count(content);
            let end = position.saturating_add(*length);

            if at <= position {
                Operation::delete(position.saturating_add(inserted), *length).into()
            } else if *at >= end {
                operation.clone().into()
            } else {
                OperationSequence::new(vec![
                    Operation::delete(*position, at - position),
                    Operation::delete(position.saturating_add(inserted), end - at),
                ])
            }
        }

        (
            Operation::Retain { .. } | Operation::Format { .. },
            Operation::Insert {
                position: at,
                content,
            },
        ) => with_range(
            operation,
            &range_past_insert(&operation.range(), *at, char_count(content)),
        )
        .into(),

        (Operation::Insert { position, .. }, Operation::Delete { .. }) => operation
            .clone()
            .with_position(map_through_delete(*position, &applied.range()))
            .into(),

        (
            Operation::Delete { .. } | Operation::Retain { .. } | Operation::Format { .. },
            Operation::Delete { .. },
        ) => with_range(
            operation,
            &range_through_delete(&operation.range(), &applied.range()),
        )
        .into(),
    }
}

/// Moves a ranged operation onto `range`. Deletes and formats that no longer
/// cover anything become no-ops.
fn with_range(operation: &Operation, range: &std::ops::Range<usize>) -> Operation {
    match operation {
        Operation::Delete { .. } | Operation::Format { .. } if range.is_empty() => {
            Operation::noop(range.start)
        }
        Operation::Insert { .. } => operation.clone().with_position(range.start),
        Operation::Delete { .. } => Operation::delete(range.start, range.len()),
        Operation::Retain { .. } => Operation::retain(range.start, range.len()),
        Operation::Format { attributes, .. } => {
            Operation::format(range.start, range.len(), attributes.clone())
        }
    }
}
