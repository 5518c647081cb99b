//! Highlight command - the cursor-to-highlight pipeline on files

use std::path::Path;

use anyhow::{Context, Result};
use inspector_pipeline::{Highlights, PositionSync};
use inspector_source_map::{Position, SourceMapIndex};

pub fn execute(map: &Path, generated: &Path, source: &str, cursor: Position) -> Result<()> {
    let index = super::load_index(map)?;
    let code = std::fs::read_to_string(generated)
        .with_context(|| format!("Failed to read generated code {}", generated.display()))?;

    let highlights = highlights_for(index, &code, source, cursor);
    println!("{}", serde_json::to_string_pretty(&highlights)?);
    Ok(())
}

fn highlights_for(
    index: SourceMapIndex,
    generated_code: &str,
    source: &str,
    cursor: Position,
) -> Highlights {
    let mut sync = PositionSync::new(source);
    sync.replace(Some(index), generated_code);
    sync.cursor_moved(cursor).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_source_map::Range;

    const MAP: &str = r#"{"version":3,"sources":["src/Demo.tsx"],"names":[],"mappings":"yBAAU,CAAC,CAAC,CAAC,CAAC,CACd,C"}"#;

    #[test]
    fn test_highlights_for_mapped_cursor() {
        let index = SourceMapIndex::from_json(MAP).unwrap();
        let code = format!("{}hello;", " ".repeat(25));

        // The map names the source by path; the bare file name still resolves
        let highlights = highlights_for(index, &code, "Demo.tsx", Position::new(1, 14));
        assert_eq!(highlights.generated_line, Some(1));
        assert_eq!(
            highlights.original_ranges.unwrap(),
            vec![
                Range {
                    line: 1,
                    start_column: 10,
                    end_column: 15
                },
                Range {
                    line: 2,
                    start_column: 0,
                    end_column: 1
                },
            ]
        );
    }

    #[test]
    fn test_unmapped_cursor_has_no_highlights() {
        let index = SourceMapIndex::from_json(MAP).unwrap();
        let highlights = highlights_for(index, "", "Demo.tsx", Position::new(1, 0));
        assert!(highlights.is_empty());
    }

    #[test]
    fn test_execute_on_files() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("out.js.map");
        let generated = dir.path().join("out.js");
        std::fs::write(&map, MAP).unwrap();
        std::fs::write(&generated, "x".repeat(31)).unwrap();

        assert!(execute(&map, &generated, "Demo.tsx", Position::new(1, 10)).is_ok());
        assert!(execute(&dir.path().join("missing.map"), &generated, "Demo.tsx", Position::new(1, 10)).is_err());
    }
}
