//! Merging per-column reverse lookups into highlight ranges

use serde::{Deserialize, Serialize};

use crate::types::{OriginalPosition, Range};

/// Merge per-column reverse lookups into contiguous ranges
///
/// `points[i]` is the original position generated column `i` maps to.
/// Columns are scanned left to right; a run is extended only while each
/// point sits on the same original line exactly at the run's `end_column`.
/// A miss, a line change, or any jump (including a repeat of the previous
/// column) closes the run.
pub fn coalesce<I>(points: I) -> Vec<Range>
where
    I: IntoIterator<Item = Option<OriginalPosition>>,
{
    let mut ranges = Vec::new();
    let mut open: Option<Range> = None;

    for point in points {
        if let (Some(pos), Some(range)) = (point, open.as_mut()) {
            if range.line == pos.line
                && range.end_column == pos.column
                && let Some(end_column) = pos.column.checked_add(1)
            {
                range.end_column = end_column;
                continue;
            }
        }

        ranges.extend(open.take());
        open = point.map(|pos| Range::single(pos.line, pos.column));
    }

    ranges.extend(open);
    ranges
}

/// The bounding envelope of a set of ranges
///
/// Only used to decide between single-line and multi-line presentation;
/// highlight geometry always comes from the ranges themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedSpan {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl MergedSpan {
    /// Envelope of `ranges`, or `None` if there are none
    pub fn envelope(ranges: &[Range]) -> Option<Self> {
        let start = ranges
            .iter()
            .min_by_key(|range| (range.line, range.start_column))?;
        let end = ranges
            .iter()
            .max_by_key(|range| (range.line, range.end_column))?;

        Some(MergedSpan {
            start_line: start.line,
            start_column: start.start_column,
            end_line: end.line,
            end_column: end.end_column,
        })
    }

    pub fn is_multi_line(&self) -> bool {
        self.start_line != self.end_line
    }
}
