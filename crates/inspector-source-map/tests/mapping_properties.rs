/*
 * mapping_properties.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property tests for the source map index and the range coalescer.
 *
 * Maps are generated with one segment per generated position, as real
 * transforms emit them, and encoded with the `sourcemap` builder so the
 * index is exercised through the same decoder used in production.
 */

use std::collections::{BTreeMap, BTreeSet};

use inspector_source_map::{
    OriginalPosition, Position, SourceId, SourceMap, SourceMapIndex, coalesce,
};
use proptest::prelude::*;

const SOURCES: [&str; 2] = ["Demo.tsx", "helpers.ts"];

type Segments = BTreeMap<(u32, u32), (usize, u32, u32)>;

/// Encode generated (line, col) -> (source, line, col) segments, 1-based lines
fn encode(segments: &Segments) -> SourceMap {
    let mut builder = sourcemap::SourceMapBuilder::new(None);
    for (&(gen_line, gen_col), &(source, src_line, src_col)) in segments {
        builder.add(
            gen_line - 1,
            gen_col,
            src_line - 1,
            src_col,
            Some(SOURCES[source]),
            None,
            false,
        );
    }

    let mut buf = Vec::new();
    builder
        .into_sourcemap()
        .to_writer(&mut buf)
        .expect("encode source map");
    SourceMap::parse(std::str::from_utf8(&buf).expect("utf8 map")).expect("parse source map")
}

fn gen_segments() -> impl Strategy<Value = Segments> {
    prop::collection::btree_map(
        (1u32..6, 0u32..40),
        (0usize..SOURCES.len(), 1u32..8, 0u32..30),
        1..60,
    )
}

fn gen_points() -> impl Strategy<Value = Vec<Option<OriginalPosition>>> {
    prop::collection::vec(
        prop::option::of((1u32..4, 0u32..12).prop_map(|(line, column)| {
            OriginalPosition::new(SourceId(0), line, column)
        })),
        0..80,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// forward then reverse never lands after the queried position
    #[test]
    fn test_forward_reverse_roundtrip(
        segments in gen_segments(),
        source in 0usize..SOURCES.len(),
        line in 1u32..9,
        column in 0u32..35,
    ) {
        let index = SourceMapIndex::build(&encode(&segments)).unwrap();
        let Some(src) = index.source_id(SOURCES[source]) else {
            // The source never appears in this map
            prop_assert!(segments.values().all(|(s, _, _)| *s != source));
            return Ok(());
        };

        if let Some(generated) = index.forward(src, line, column) {
            let original = index.reverse(generated.line, generated.column);
            prop_assert!(original.is_some());
            let original = original.unwrap();
            prop_assert_eq!(original.source, src);
            prop_assert!(original.position() <= Position::new(line, column));
        }
    }

    /// Every segment answers its own reverse lookup exactly
    #[test]
    fn test_reverse_hits_each_segment(segments in gen_segments()) {
        let index = SourceMapIndex::build(&encode(&segments)).unwrap();
        for (&(gen_line, gen_col), &(source, src_line, src_col)) in &segments {
            let original = index.reverse(gen_line, gen_col).unwrap();
            prop_assert_eq!(index.source(original.source), Some(SOURCES[source]));
            prop_assert_eq!(original.position(), Position::new(src_line, src_col));
        }
    }

    /// Two indexes of the same map answer identically
    #[test]
    fn test_index_is_deterministic(segments in gen_segments(), line in 1u32..7) {
        let map = encode(&segments);
        let first = SourceMapIndex::build(&map).unwrap();
        let second = SourceMapIndex::build(&map).unwrap();

        prop_assert_eq!(first.reverse_line(line, 45), second.reverse_line(line, 45));
        prop_assert_eq!(first.entries(), second.entries());
    }

    /// Ranges cover exactly the found columns, each exactly once
    #[test]
    fn test_coalesce_covers_found_columns(points in gen_points()) {
        let ranges = coalesce(points.clone());

        let found: BTreeSet<(u32, u32)> = points
            .iter()
            .flatten()
            .map(|pos| (pos.line, pos.column))
            .collect();
        let covered: BTreeSet<(u32, u32)> = ranges
            .iter()
            .flat_map(|range| {
                (range.start_column..range.end_column).map(move |column| (range.line, column))
            })
            .collect();
        prop_assert_eq!(covered, found);

        let total_width: u32 = ranges.iter().map(|range| range.width()).sum();
        prop_assert_eq!(total_width as usize, points.iter().flatten().count());
        prop_assert!(ranges.iter().all(|range| range.start_column < range.end_column));
    }

    /// Runs are maximal: consecutive found points that continue a run are never split
    #[test]
    fn test_coalesce_runs_are_maximal(points in gen_points()) {
        let mut expected_breaks = 0usize;
        let mut previous: Option<OriginalPosition> = None;
        for point in &points {
            match (previous, point) {
                (Some(prev), Some(pos)) if prev.line == pos.line && prev.column + 1 == pos.column => {}
                (_, Some(_)) => expected_breaks += 1,
                _ => {}
            }
            previous = *point;
        }

        prop_assert_eq!(coalesce(points).len(), expected_breaks);
    }
}

#[test]
fn test_scenario_split_line_highlight() {
    // Columns 25..=29 -> line 1 columns 10..=14, column 30 -> (2,0), 31.. unmapped
    let mut segments = Segments::new();
    for offset in 0..5 {
        segments.insert((1, 25 + offset), (0, 1, 10 + offset));
    }
    segments.insert((1, 30), (0, 2, 0));
    let mut map = encode(&segments);
    // Terminate the last mapping with an unmapped segment at column 31
    map.mappings.push_str(",C");

    let index = SourceMapIndex::build(&map).unwrap();
    let ranges = coalesce(index.reverse_line(1, 40));
    assert_eq!(
        serde_json::to_value(&ranges).unwrap(),
        serde_json::json!([
            {"line": 1, "startColumn": 10, "endColumn": 15},
            {"line": 2, "startColumn": 0, "endColumn": 1}
        ])
    );
}
