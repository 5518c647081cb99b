//! Precomputed line starts for repeated position lookups

use crate::types::Position;
use crate::utils::utf16_len;

/// Line layout of a text, for fast offset and line length lookups
///
/// Scans the text once; lookups afterwards are a binary search over the
/// line breaks instead of a rescan from the start of the text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    /// Byte offsets of each newline character
    line_breaks: Vec<usize>,

    /// Length of each line in UTF-16 code units, newline excluded
    line_lengths: Vec<u32>,

    /// Total length of the text in bytes
    total_length: usize,
}

impl LineIndex {
    /// Analyze `content` and record where its lines start
    ///
    /// # Example
    ///
    /// ```
    /// use inspector_source_map::LineIndex;
    ///
    /// let index = LineIndex::new("const a = 1;\nconst b = 2;");
    /// assert_eq!(index.line_count(), 2);
    /// assert_eq!(index.line_len(2), Some(12));
    /// ```
    pub fn new(content: &str) -> Self {
        let line_breaks: Vec<usize> = content
            .char_indices()
            .filter_map(|(idx, ch)| if ch == '\n' { Some(idx) } else { None })
            .collect();
        let line_lengths = content.split('\n').map(utf16_len).collect();

        LineIndex {
            line_breaks,
            line_lengths,
            total_length: content.len(),
        }
    }

    /// Convert a byte offset in `content` to a line/column position
    ///
    /// `content` must be the text this index was built from. Returns `None`
    /// if the offset is out of bounds or not on a character boundary.
    pub fn position_of(&self, offset: usize, content: &str) -> Option<Position> {
        if offset > self.total_length || !content.is_char_boundary(offset) {
            return None;
        }

        // A newline belongs to the line it terminates
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };

        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };

        Some(Position::new(
            row as u32 + 1,
            utf16_len(content.get(line_start..offset)?),
        ))
    }

    /// Length of a 1-based line in UTF-16 code units
    pub fn line_len(&self, line: u32) -> Option<u32> {
        let idx = (line as usize).checked_sub(1)?;
        self.line_lengths.get(idx).copied()
    }

    /// Number of lines (a trailing newline starts an empty last line)
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }

    /// Total length of the text in bytes
    pub fn total_length(&self) -> usize {
        self.total_length
    }
}
