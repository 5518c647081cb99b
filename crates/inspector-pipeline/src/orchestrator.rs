/*
 * orchestrator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Keeps the generated-side and original-side highlights in step with the
 * editor cursor and the current source map.
 */

use inspector_source_map::{
    LineIndex, MergedSpan, Position, Range, SourceMapIndex, coalesce,
};
use serde::Serialize;
use tracing::trace;

/// What the two panes should highlight
///
/// Both fields are either present together or absent together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    /// 1-based line of the generated code holding the cursor's mapping
    pub generated_line: Option<u32>,
    /// Original ranges every column of that generated line came from
    pub original_ranges: Option<Vec<Range>>,
}

impl Highlights {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.generated_line.is_none()
    }

    /// Bounding span of the original ranges, for multi-line presentation
    pub fn span(&self) -> Option<MergedSpan> {
        MergedSpan::envelope(self.original_ranges.as_deref()?)
    }
}

/// Derives [`Highlights`] from a cursor position and the current source map
///
/// Holds the last cursor position so that a new map or a renamed source
/// re-derives the highlights without waiting for the cursor to move.
#[derive(Debug, Clone)]
pub struct PositionSync {
    index: Option<SourceMapIndex>,
    generated_lines: LineIndex,
    source_name: String,
    cursor: Option<Position>,
    highlights: Highlights,
}

impl PositionSync {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            index: None,
            generated_lines: LineIndex::default(),
            source_name: source_name.into(),
            cursor: None,
            highlights: Highlights::none(),
        }
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn index(&self) -> Option<&SourceMapIndex> {
        self.index.as_ref()
    }

    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    pub fn cursor_moved(&mut self, position: Position) -> &Highlights {
        self.cursor = Some(position);
        self.recompute()
    }

    /// Install the map and generated code of a new successful compile
    ///
    /// `None` means the compile produced no usable map; highlights clear.
    pub fn replace(&mut self, index: Option<SourceMapIndex>, generated_code: &str) -> &Highlights {
        self.index = index;
        self.generated_lines = LineIndex::new(generated_code);
        self.recompute()
    }

    /// Forget the current map, for when it no longer describes the source
    pub fn clear(&mut self) {
        self.index = None;
        self.highlights = Highlights::none();
    }

    pub fn set_source_name(&mut self, name: impl Into<String>) -> &Highlights {
        self.source_name = name.into();
        self.recompute()
    }

    fn recompute(&mut self) -> &Highlights {
        self.highlights = self.compute().unwrap_or_default();
        &self.highlights
    }

    fn compute(&self) -> Option<Highlights> {
        let index = self.index.as_ref()?;
        let cursor = self.cursor?;
        let source = index.source_id(&self.source_name)?;

        let Some(generated) = index.forward(source, cursor.line, cursor.column) else {
            trace!(line = cursor.line, column = cursor.column, "Cursor is not mapped");
            return None;
        };

        let line_length = self.generated_lines.line_len(generated.line).unwrap_or(0);
        let original_ranges = coalesce(index.reverse_line(generated.line, line_length));
        trace!(
            generated_line = generated.line,
            ranges = original_ranges.len(),
            "Highlights updated"
        );

        Some(Highlights {
            generated_line: Some(generated.line),
            original_ranges: Some(original_ranges),
        })
    }
}
