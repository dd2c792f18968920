use ropey::Rope;

use crate::{
    Operation,
    errors::{ApplyError, SequenceApplyError},
};

/// Applies a single operation to `document` and returns the edited text.
/// `Retain` and `Format` leave the text as is but are still bounds-checked.
///
/// ```
/// use converge::{Operation, apply};
///
/// assert_eq!(apply("AC", &Operation::insert(1, "B")).unwrap(), "ABC");
/// assert!(apply("abc", &Operation::delete(1, 10)).is_err());
/// ```
///
/// # Errors
///
/// Returns `ApplyError::OutOfBounds` if the operation doesn't fit the
/// document.
pub fn apply(document: &str, operation: &Operation) -> Result<String, ApplyError> {
    let mut rope = Rope::from_str(document);
    operation.apply_to_rope(&mut rope)?;

    Ok(rope.to_string())
}

/// Applies `operations` left to right, failing fast on the first one that
/// doesn't fit.
///
/// # Errors
///
/// Returns `SequenceApplyError::Failed` with the index of the failing
/// operation.
pub fn apply_sequence<'a, I>(document: &str, operations: I) -> Result<String, SequenceApplyError>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut rope = Rope::from_str(document);

    for (index, operation) in operations.into_iter().enumerate() {
        operation
            .apply_to_rope(&mut rope)
            .map_err(|source| SequenceApplyError::Failed { index, source })?;
    }

    Ok(rope.to_string())
}
