use ropey::Rope;

use crate::{
    Operation, OperationSequence, char_count, cleared,
    errors::{ApplyError, SequenceApplyError},
    utils::char_offset::byte_offset,
};

/// Merges two sequential operations (`second` was generated against the
/// document produced by `first`) into a single one with the same effect on
/// the text. Returns `None` if no single operation is equivalent.
#[must_use]
pub fn try_compose(first: &Operation, second: &Operation) -> Option<Operation> {
    if second.is_noop() {
        return Some(first.clone());
    }
    if first.is_noop() {
        return Some(second.clone());
    }

    match (first, second) {
        (
            Operation::Insert { position, content },
            Operation::Insert {
                position: at,
                content: inserted,
            },
        ) if (*position..=position.saturating_add(char_count(content))).contains(at) => {
            let offset = byte_offset(content, at - position);

            Some(Operation::insert(
                *position,
                [&content[..offset], inserted.as_str(), &content[offset..]].concat(),
            ))
        }

        (Operation::Insert { position, content }, Operation::Delete { position: at, length })
            if position <= at
                && at
                    .checked_add(*length)
                    .is_some_and(|end| end <= position.saturating_add(char_count(content))) =>
        {
            let start = byte_offset(content, at - position);
            let end = byte_offset(content, at - position + length);
            let remaining = [&content[..start], &content[end..]].concat();

            if remaining.is_empty() {
                Some(Operation::delete(*position, 0))
            } else {
                Some(Operation::insert(*position, remaining))
            }
        }

        (Operation::Delete { position, length }, Operation::Delete { position: at, length: more })
            if at == position || at.checked_add(*more) == Some(*position) =>
        {
            Some(Operation::delete(*at, length.checked_add(*more)?))
        }

        (
            Operation::Format {
                position,
                length,
                attributes,
            },
            Operation::Format {
                position: at,
                length: other_length,
                attributes: later,
            },
        ) if position == at && length == other_length => {
            let mut merged = attributes.clone();
            merged.extend(later.clone());

            Some(Operation::format(*position, *length, merged))
        }

        _ => None,
    }
}

/// Like [`try_compose`] but falls back to `second` when the two operations
/// can't be merged.
#[must_use]
pub fn compose(first: &Operation, second: &Operation) -> Operation {
    try_compose(first, second).unwrap_or_else(|| second.clone())
}

/// Returns the operation that undoes `operation`, given the document it was
/// applied to. Inverting a format clears the keys it set since the previous
/// values are not tracked.
///
/// ```
/// use converge::{Operation, apply, invert};
///
/// let delete = Operation::delete(1, 3);
/// let undo = invert(&delete, "abcde").unwrap();
///
/// assert_eq!(undo, Operation::insert(1, "bcd"));
/// assert_eq!(apply(&apply("abcde", &delete).unwrap(), &undo).unwrap(), "abcde");
/// ```
///
/// # Errors
///
/// Returns `ApplyError::OutOfBounds` if `operation` doesn't fit
/// `document_before`.
pub fn invert(operation: &Operation, document_before: &str) -> Result<Operation, ApplyError> {
    invert_against_rope(operation, &Rope::from_str(document_before))
}

/// Inverts every operation of a sequence. The inverses are returned in
/// reverse order so that applying them after `operations` restores
/// `document_before`.
///
/// # Errors
///
/// Returns the index of the first operation that didn't fit the document it
/// was meant for.
pub fn invert_sequence<'a, I>(
    operations: I,
    document_before: &str,
) -> Result<OperationSequence, SequenceApplyError>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut rope = Rope::from_str(document_before);
    let mut inverses = Vec::new();

    for (index, operation) in operations.into_iter().enumerate() {
        let inverse = invert_against_rope(operation, &rope)
            .and_then(|inverse| operation.apply_to_rope(&mut rope).map(|()| inverse))
            .map_err(|source| SequenceApplyError::Failed { index, source })?;

        inverses.push(inverse);
    }

    inverses.reverse();
    Ok(inverses.into())
}

fn invert_against_rope(operation: &Operation, rope: &Rope) -> Result<Operation, ApplyError> {
    operation.check_bounds(rope.len_chars())?;

    Ok(match operation {
        Operation::Insert { position, content } => Operation::delete(*position, char_count(content)),
        Operation::Delete { position, length: 0 } => Operation::noop(*position),
        Operation::Delete { position, length } => {
            Operation::insert(*position, rope.slice(*position..position + length).to_string())
        }
        Operation::Retain { .. } => operation.clone(),
        Operation::Format {
            position,
            length,
            attributes,
        } => Operation::format(*position, *length, cleared(attributes)),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::{Attributes, apply, apply_sequence};

    fn bold() -> Attributes { Attributes::from([("bold".to_owned(), Some(true.into()))]) }

    #[test_case(Operation::insert(0, "ab"), Operation::insert(2, "c"), Some(Operation::insert(0, "abc")) ; "typing forward")]
    #[test_case(Operation::insert(3, "ac"), Operation::insert(4, "b"), Some(Operation::insert(3, "abc")) ; "insert in the middle")]
    #[test_case(Operation::insert(3, "bc"), Operation::insert(3, "a"), Some(Operation::insert(3, "abc")) ; "insert in front")]
    #[test_case(Operation::insert(0, "ab"), Operation::insert(3, "c"), None ; "separate inserts")]
    #[test_case(Operation::insert(1, "abc"), Operation::delete(2, 1), Some(Operation::insert(1, "ac")) ; "delete part of the insert")]
    #[test_case(Operation::insert(1, "abc"), Operation::delete(1, 3), Some(Operation::delete(1, 0)) ; "delete the whole insert")]
    #[test_case(Operation::insert(1, "abc"), Operation::delete(0, 2), None ; "delete reaching outside the insert")]
    #[test_case(Operation::delete(4, 2), Operation::delete(4, 3), Some(Operation::delete(4, 5)) ; "forward delete")]
    #[test_case(Operation::delete(4, 1), Operation::delete(3, 1), Some(Operation::delete(3, 2)) ; "backspace")]
    #[test_case(Operation::delete(4, 1), Operation::delete(1, 1), None ; "separate deletes")]
    #[test_case(Operation::delete(4, 1), Operation::retain(0, 9), Some(Operation::delete(4, 1)) ; "followed by retain")]
    #[test_case(Operation::noop(2), Operation::insert(0, "x"), Some(Operation::insert(0, "x")) ; "after noop")]
    #[test_case(Operation::insert(0, "x"), Operation::delete(0, 0), Some(Operation::insert(0, "x")) ; "followed by empty delete")]
    #[test_case(Operation::delete(1, usize::MAX), Operation::delete(0, 1), None ; "combined delete overflows")]
    #[test_case(Operation::insert(1, "abc"), Operation::delete(2, usize::MAX), None ; "delete overflows past the insert")]
    fn test_try_compose(first: Operation, second: Operation, expected: Option<Operation>) {
        assert_eq!(try_compose(&first, &second), expected);
    }

    #[test]
    fn test_compose_multi_byte_content() {
        assert_eq!(
            compose(&Operation::insert(0, "こんちは"), &Operation::insert(2, "に")),
            Operation::insert(0, "こんにちは")
        );
        assert_eq!(
            compose(&Operation::insert(0, "こんにちは"), &Operation::delete(1, 3)),
            Operation::insert(0, "こは")
        );
    }

    #[test]
    fn test_compose_falls_back_to_second() {
        assert_eq!(
            compose(&Operation::delete(0, 1), &Operation::insert(5, "x")),
            Operation::insert(5, "x")
        );
    }

    #[test]
    fn test_compose_formats_merges_attributes() {
        let italic_without_bold = Attributes::from([
            ("bold".to_owned(), None),
            ("italic".to_owned(), Some(true.into())),
        ]);

        assert_eq!(
            compose(
                &Operation::format(1, 2, bold()),
                &Operation::format(1, 2, italic_without_bold.clone())
            ),
            Operation::format(1, 2, italic_without_bold)
        );
    }

    #[test]
    fn test_composed_operation_edits_like_both() {
        let document = "Hello World";
        let first = Operation::insert(5, ", dear");
        let second = Operation::delete(7, 3);

        let composed = try_compose(&first, &second).unwrap();

        assert_eq!(
            apply(document, &composed).unwrap(),
            apply_sequence(document, [&first, &second]).unwrap()
        );
    }

    #[test_case("abcde", Operation::insert(2, "XY") ; "insert")]
    #[test_case("abcde", Operation::delete(1, 3) ; "delete")]
    #[test_case("abcde", Operation::delete(5, 0) ; "empty delete at the end")]
    #[test_case("こんにちは", Operation::delete(0, 2) ; "multi byte delete")]
    fn test_invert_undoes(document: &str, operation: Operation) {
        let inverse = invert(&operation, document).unwrap();
        let edited = apply(document, &operation).unwrap();

        assert_eq!(apply(&edited, &inverse).unwrap(), document);
    }

    #[test]
    fn test_invert_format_clears_keys() {
        assert_eq!(
            invert(&Operation::format(0, 2, bold()), "abc"),
            Ok(Operation::format(
                0,
                2,
                Attributes::from([("bold".to_owned(), None)])
            ))
        );
        assert_eq!(
            invert(&Operation::retain(1, 2), "abc"),
            Ok(Operation::retain(1, 2))
        );
    }

    #[test]
    fn test_invert_out_of_bounds() {
        assert_eq!(
            invert(&Operation::delete(2, 5), "abc"),
            Err(ApplyError::OutOfBounds {
                position: 2,
                length: 5,
                document_length: 3
            })
        );
    }

    #[test]
    fn test_invert_sequence_restores_document() {
        let document = "Hello World";
        let operations = vec![
            Operation::delete(0, 6),
            Operation::insert(5, "!"),
            Operation::insert(0, "Brave new "),
            Operation::delete(10, 1),
        ];

        let edited = apply_sequence(document, &operations).unwrap();
        assert_eq!(edited, "Brave new orld!");

        let inverses = invert_sequence(&operations, document).unwrap();
        assert_eq!(inverses.len(), operations.len());
        assert_eq!(apply_sequence(&edited, &inverses).unwrap(), document);
    }

    #[test]
    fn test_invert_sequence_reports_failing_index() {
        let error =
            invert_sequence(&[Operation::delete(0, 1), Operation::delete(2, 1)], "abc").unwrap_err();

        assert_eq!(error.index(), 1);
    }
}
