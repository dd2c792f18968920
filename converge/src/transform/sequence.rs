use super::{TransformResult, transform};
use crate::{Operation, OperationSequence, Side};

/// Transforms two concurrent sequences against each other. `result.left`
/// applies after all of `right`, `result.right` after all of `left`, and both
/// orders converge. Every operation of `left` keeps the given `priority`
/// against every operation of `right`.
#[must_use]
pub fn transform_sequences(
    left: &OperationSequence,
    right: &OperationSequence,
    priority: Side,
) -> TransformResult {
    let (left, right) = transform_slices(left.as_slice(), right.as_slice(), priority);

    TransformResult {
        left: left.into(),
        right: right.into(),
    }
}

fn transform_slices(
    left: &[Operation],
    right: &[Operation],
    priority: Side,
) -> (Vec<Operation>, Vec<Operation>) {
    match (left, right) {
        ([], _) | (_, []) => (left.to_vec(), right.to_vec()),

        ([single_left], [single_right]) => {
            let result = transform(single_left, single_right, priority);
            (result.left.into_operations(), result.right.into_operations())
        }

        ([_], [first_right, rest_right @ ..]) => {
            let (left, mut transformed_right) =
                transform_slices(left, std::slice::from_ref(first_right), priority);
            let (left, rest_right) = transform_slices(&left, rest_right, priority);

            transformed_right.extend(rest_right);
            (left, transformed_right)
        }

        ([first_left, rest_left @ ..], _) => {
            let (mut transformed_left, right) =
                transform_slices(std::slice::from_ref(first_left), right, priority);
            let (rest_left, right) = transform_slices(rest_left, &right, priority);

            transformed_left.extend(rest_left);
            (transformed_left, right)
        }
    }
}
