//! Forward and reverse position lookups over a decoded source map

use tracing::{debug, trace};

use crate::error::{MapError, Result};
use crate::map::SourceMap;
use crate::types::{NameId, OriginalPosition, Position, SourceId};

/// Marker the decoder uses for a segment without a source or name
const ABSENT: u32 = !0;

/// Largest 0-based line or column a segment may carry
///
/// The decoder keeps running positions as `u32`, so a delta that takes a
/// position below zero wraps to a value above this bound.
const MAX_POSITION: u32 = i32::MAX as u32;

/// Convert a decoded 0-based line and column to a public position
fn checked_position(line: u32, column: u32) -> Result<(u32, u32)> {
    if line > MAX_POSITION || column > MAX_POSITION {
        return Err(MapError::PositionOutOfRange { line, column });
    }
    Ok((line + 1, column))
}

/// One decoded segment of a source map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    /// Where the segment starts in the generated text
    pub generated: Position,
    /// Where it came from, or `None` for a segment that marks unmapped output
    pub original: Option<OriginalPosition>,
    pub name: Option<NameId>,
}

/// A queryable view of a [`SourceMap`]
///
/// The index is built once per compile result and never mutated; a newer
/// result replaces it wholesale.
///
/// Both lookup directions follow the usual source map rule: a segment marks
/// the start of a run of positions it is responsible for, so a query is
/// answered by the greatest segment whose key is `<=` the queried position.
#[derive(Debug, Clone)]
pub struct SourceMapIndex {
    sources: Vec<String>,
    source_root: Option<String>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    /// All segments, ordered by generated position
    entries: Vec<MappingEntry>,
    /// Mapped segments keyed by original position, ties ordered by generated position
    by_original: Vec<(OriginalPosition, Position)>,
}

impl SourceMapIndex {
    /// Decode a source map into an index
    ///
    /// Fails as a whole if any segment cannot be decoded; there is no
    /// partially built index.
    pub fn build(map: &SourceMap) -> Result<Self> {
        if map.version != 3 {
            return Err(MapError::UnsupportedVersion(map.version));
        }

        let raw = serde_json::to_vec(map)?;
        let decoded = sourcemap::SourceMap::from_slice(&raw).map_err(MapError::Mappings)?;

        let declared = map.sources.len();
        let mut entries = Vec::with_capacity(decoded.get_token_count() as usize);
        for token in decoded.tokens() {
            let (line, column) = checked_position(token.get_dst_line(), token.get_dst_col())?;
            let generated = Position::new(line, column);

            let src_id = token.get_src_id();
            let original = if src_id == ABSENT {
                None
            } else if src_id as usize >= declared {
                return Err(MapError::SourceOutOfRange {
                    index: src_id,
                    declared,
                });
            } else {
                let (line, column) = checked_position(token.get_src_line(), token.get_src_col())?;
                Some(OriginalPosition::new(SourceId(src_id), line, column))
            };

            let name_id = token.get_name_id();
            let name = (name_id != ABSENT && (name_id as usize) < map.names.len())
                .then_some(NameId(name_id));

            entries.push(MappingEntry {
                generated,
                original,
                name,
            });
        }

        // Decoders emit segments in generated order already; a stable sort
        // keeps the encoded order of ties.
        entries.sort_by_key(|entry| entry.generated);

        let mut by_original: Vec<(OriginalPosition, Position)> = entries
            .iter()
            .filter_map(|entry| entry.original.map(|original| (original, entry.generated)))
            .collect();
        by_original.sort();

        debug!(
            segments = entries.len(),
            mapped = by_original.len(),
            sources = declared,
            "Built source map index"
        );

        let sources_content = map
            .sources_content
            .clone()
            .unwrap_or_else(|| vec![None; declared]);

        Ok(SourceMapIndex {
            sources: map.sources.clone(),
            source_root: map.source_root.clone(),
            sources_content,
            names: map.names.clone(),
            entries,
            by_original,
        })
    }

    /// Parse and index a source map given as JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Self::build(&SourceMap::parse(json)?)
    }

    /// Where did `(line, column)` of `source` land in the generated text?
    ///
    /// Returns the generated start of the greatest mapped original position
    /// `<=` the query within the same source. When several segments share that
    /// original position, the earliest generated one wins.
    pub fn forward(&self, source: SourceId, line: u32, column: u32) -> Option<Position> {
        let needle = OriginalPosition::new(source, line, column);
        let end = self
            .by_original
            .partition_point(|(original, _)| *original <= needle);
        let (found, _) = *self.by_original.get(end.checked_sub(1)?)?;
        if found.source != source {
            trace!(line, column, "Forward lookup fell outside source");
            return None;
        }

        let first = self
            .by_original
            .partition_point(|(original, _)| *original < found);
        let generated = self.by_original.get(first).map(|(_, generated)| *generated);
        trace!(line, column, ?generated, "Forward lookup");
        generated
    }

    /// Which original position does generated `(line, column)` come from?
    ///
    /// Only segments on the same generated line are considered. Columns
    /// before the first segment of a line, and columns covered by a segment
    /// without a source, have no original position.
    pub fn reverse(&self, line: u32, column: u32) -> Option<OriginalPosition> {
        self.reverse_entry(line, column)?.original
    }

    /// The segment responsible for generated `(line, column)`, if any
    pub fn reverse_entry(&self, line: u32, column: u32) -> Option<&MappingEntry> {
        let needle = Position::new(line, column);
        let end = self
            .entries
            .partition_point(|entry| entry.generated <= needle);
        let found = self.entries.get(end.checked_sub(1)?)?;
        if found.generated.line != line {
            return None;
        }

        let first = self
            .entries
            .partition_point(|entry| entry.generated < found.generated);
        self.entries.get(first)
    }

    /// Reverse lookups for every column `0..line_length` of a generated line
    ///
    /// Element `i` of the result answers column `i`.
    pub fn reverse_line(&self, line: u32, line_length: u32) -> Vec<Option<OriginalPosition>> {
        (0..line_length)
            .map(|column| self.reverse(line, column))
            .collect()
    }

    /// Resolve a file identifier to its entry in the `sources` table
    ///
    /// An exact match wins, then a match after joining `sourceRoot`, then a
    /// match on the final path component.
    pub fn source_id(&self, name: &str) -> Option<SourceId> {
        let to_id = |idx: usize| SourceId(idx as u32);

        if let Some(idx) = self.sources.iter().position(|source| source == name) {
            return Some(to_id(idx));
        }

        if let Some(root) = self.source_root.as_deref().filter(|root| !root.is_empty()) {
            let separator = if root.ends_with('/') { "" } else { "/" };
            if let Some(idx) = self
                .sources
                .iter()
                .position(|source| format!("{}{}{}", root, separator, source) == name)
            {
                return Some(to_id(idx));
            }
        }

        let base = file_name(name);
        self.sources
            .iter()
            .position(|source| file_name(source) == base)
            .map(to_id)
    }

    pub fn source(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.0 as usize).map(String::as_str)
    }

    pub fn source_content(&self, id: SourceId) -> Option<&str> {
        self.sources_content
            .get(id.0 as usize)
            .and_then(|content| content.as_deref())
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn name(&self, id: NameId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All segments in generated order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
