/// Number of characters (Unicode scalar values) in `text`. All positions and
/// lengths of operations are counted in characters, never in bytes.
#[must_use]
pub fn char_count(text: &str) -> usize { text.chars().count() }

/// Byte offset of the character at `char_index`, or the byte length of `text`
/// when `char_index` points right after the last character.
#[must_use]
pub fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}
