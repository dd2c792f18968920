use std::ops::Range;

/// Maps `offset` past an insert of `inserted` characters at `at`. Offsets at
/// or after the insert move right.
pub fn shift_past_insert(offset: usize, at: usize, inserted: usize) -> usize {
    if at <= offset { offset.saturating_add(inserted) } else { offset }
}

/// Maps `offset` through the removal of `deleted`. Offsets inside the removed
/// range collapse onto its start.
pub fn map_through_delete(offset: usize, deleted: &Range<usize>) -> usize {
    if offset <= deleted.start {
        offset
    } else if offset >= deleted.end {
        offset - deleted.len()
    } else {
        deleted.start
    }
}

/// Maps a marked range past an insert. An insert at the start shifts the
/// range, one strictly inside grows it.
pub fn range_past_insert(range: &Range<usize>, at: usize, inserted: usize) -> Range<usize> {
    let start = shift_past_insert(range.start, at, inserted);
    let end = if at <= range.start || at < range.end {
        range.end.saturating_add(inserted)
    } else {
        range.end
    };

    start..end
}

/// Clips a range by a concurrent delete.
pub fn range_through_delete(range: &Range<usize>, deleted: &Range<usize>) -> Range<usize> {
    map_through_delete(range.start, deleted)..map_through_delete(range.end, deleted)
}
