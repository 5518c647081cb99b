//! Core types for position mapping

use serde::{Deserialize, Serialize};

/// Index of a file in a source map's `sources` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

/// Index of an identifier in a source map's `names` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameId(pub u32);

/// A position in text
///
/// Lines are 1-based and columns 0-based (UTF-16 code units), the
/// convention used by source map consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// A position in one of the original sources of a source map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OriginalPosition {
    /// The source file this position belongs to
    pub source: SourceId,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub column: u32,
}

impl OriginalPosition {
    pub fn new(source: SourceId, line: u32, column: u32) -> Self {
        OriginalPosition {
            source,
            line,
            column,
        }
    }

    /// The line/column part, without the source
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// A highlighted run of columns on a single line
///
/// Invariant: `start_column < end_column` and `line >= 1`. Multi-line
/// highlights are sequences of ranges, one per covered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub line: u32,
    /// First covered column (inclusive)
    pub start_column: u32,
    /// One past the last covered column (exclusive)
    pub end_column: u32,
}

impl Range {
    /// A one-column range at `(line, column)`
    pub fn single(line: u32, column: u32) -> Self {
        Range {
            line,
            start_column: column,
            end_column: column.saturating_add(1),
        }
    }

    /// Number of covered columns
    pub fn width(&self) -> u32 {
        self.end_column - self.start_column
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.line == self.line && self.start_column <= pos.column && pos.column < self.end_column
    }
}
