//! Utility functions for working with text positions

use crate::types::Position;

/// Length of `text` in UTF-16 code units, the unit source map columns count in
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|ch| ch.len_utf16() as u32).sum()
}

/// Convert a byte offset into a 1-based line / 0-based column position
///
/// Scans from the start of the text; use [`LineIndex`](crate::LineIndex)
/// when converting many offsets of the same text.
/// Returns `None` if the offset is out of bounds or not on a character boundary.
pub fn offset_to_position(source: &str, offset: usize) -> Option<Position> {
    let before = source.get(..offset)?;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let line = before.matches('\n').count() as u32 + 1;

    Some(Position::new(line, utf16_len(&before[line_start..])))
}

/// Convert a 1-based line / 0-based column position back to a byte offset
///
/// The column may point one past the last character of a line. Returns
/// `None` for positions outside the text or inside a surrogate pair.
pub fn position_to_offset(source: &str, position: Position) -> Option<usize> {
    let line_idx = (position.line as usize).checked_sub(1)?;

    let mut line_start = 0;
    for _ in 0..line_idx {
        line_start += source.get(line_start..)?.find('\n')? + 1;
    }

    let line = source[line_start..]
        .split('\n')
        .next()
        .unwrap_or_default();

    let mut column = 0;
    for (idx, ch) in line.char_indices() {
        if column == position.column {
            return Some(line_start + idx);
        }
        column += ch.len_utf16() as u32;
        if column > position.column {
            return None;
        }
    }

    (column == position.column).then_some(line_start + line.len())
}
