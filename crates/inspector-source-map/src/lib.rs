//! Position mapping between a source file and its transformed output
//!
//! This crate answers the two questions a live transform inspector keeps
//! asking: where did an original position land in the generated text, and
//! which original positions does a generated line come from. It is pure and
//! synchronous, so every query is safe to run inside an event handler.
//!
//! # Overview
//!
//! The core types are:
//! - [`SourceMap`]: the revision 3 source map value a transform returns
//! - [`SourceMapIndex`]: a decoded, sorted view supporting forward and reverse lookups
//! - [`coalesce`]: merges per-column reverse lookups into highlight [`Range`]s
//! - [`LineIndex`]: line layout of a text, used for line lengths and offsets
//!
//! # Example
//!
//! ```rust
//! use inspector_source_map::*;
//!
//! // Generated (1,25) comes from original (1,10) of Demo.tsx
//! let index = SourceMapIndex::from_json(
//!     r#"{"version":3,"sources":["Demo.tsx"],"names":[],"mappings":"yBAAU"}"#,
//! )
//! .unwrap();
//!
//! let src = index.source_id("Demo.tsx").unwrap();
//! assert_eq!(index.forward(src, 1, 10), Some(Position::new(1, 25)));
//!
//! let ranges = coalesce(index.reverse_line(1, 26));
//! assert_eq!(ranges, vec![Range { line: 1, start_column: 10, end_column: 11 }]);
//! ```

pub mod coalesce;
pub mod error;
pub mod index;
pub mod line_index;
pub mod map;
pub mod types;
pub mod utils;

// Re-export main types
pub use coalesce::{MergedSpan, coalesce};
pub use error::{MapError, Result};
pub use index::{MappingEntry, SourceMapIndex};
pub use line_index::LineIndex;
pub use map::{MapPayload, SourceMap};
pub use types::{NameId, OriginalPosition, Position, Range, SourceId};
pub use utils::{offset_to_position, position_to_offset, utf16_len};
