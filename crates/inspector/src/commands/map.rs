//! Map commands - direct source map queries
//!
//! Results are printed as JSON; a position that does not map prints `null`.

use std::path::Path;

use anyhow::{Context, Result};
use inspector_source_map::{LineIndex, SourceMapIndex, coalesce};
use serde_json::{Value, json};

use super::load_index;

pub fn forward(map: &Path, source: &str, line: u32, column: u32) -> Result<()> {
    let index = load_index(map)?;
    print_json(&forward_query(&index, source, line, column))
}

pub fn reverse(map: &Path, line: u32, column: u32) -> Result<()> {
    let index = load_index(map)?;
    print_json(&reverse_query(&index, line, column))
}

pub fn line(map: &Path, generated: &Path, line: u32) -> Result<()> {
    let index = load_index(map)?;
    let code = std::fs::read_to_string(generated)
        .with_context(|| format!("Failed to read generated code {}", generated.display()))?;
    print_json(&line_query(&index, &code, line))
}

fn forward_query(index: &SourceMapIndex, source: &str, line: u32, column: u32) -> Value {
    index
        .source_id(source)
        .and_then(|id| index.forward(id, line, column))
        .map_or(Value::Null, |generated| json!(generated))
}

fn reverse_query(index: &SourceMapIndex, line: u32, column: u32) -> Value {
    match index.reverse_entry(line, column) {
        Some(entry) => match entry.original {
            Some(original) => json!({
                "source": index.source(original.source),
                "line": original.line,
                "column": original.column,
                "name": entry.name.and_then(|name| index.name(name)),
            }),
            None => Value::Null,
        },
        None => Value::Null,
    }
}

fn line_query(index: &SourceMapIndex, code: &str, line: u32) -> Value {
    let length = LineIndex::new(code).line_len(line).unwrap_or(0);
    json!(coalesce(index.reverse_line(line, length)))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SourceMapIndex {
        // Generated (1,25..=29) -> (1,10..=14) with name "greet", (1,30) -> (2,0)
        SourceMapIndex::from_json(
            r#"{"version":3,"sources":["Demo.tsx"],"names":["greet"],"mappings":"yBAAUA,CAAC,CAAC,CAAC,CAAC,CACd,C"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_forward_query() {
        let index = index();
        assert_eq!(
            forward_query(&index, "Demo.tsx", 1, 12),
            json!({"line": 1, "column": 27})
        );
        assert_eq!(forward_query(&index, "Demo.tsx", 1, 2), Value::Null);
        assert_eq!(forward_query(&index, "Other.tsx", 1, 12), Value::Null);
    }

    #[test]
    fn test_reverse_query() {
        let index = index();
        assert_eq!(
            reverse_query(&index, 1, 25),
            json!({"source": "Demo.tsx", "line": 1, "column": 10, "name": "greet"})
        );
        assert_eq!(
            reverse_query(&index, 1, 30),
            json!({"source": "Demo.tsx", "line": 2, "column": 0, "name": null})
        );
        // Before the first segment, and after the unmapped terminator
        assert_eq!(reverse_query(&index, 1, 3), Value::Null);
        assert_eq!(reverse_query(&index, 1, 40), Value::Null);
    }

    #[test]
    fn test_line_query() {
        let index = index();
        let code = format!("{}hello;", " ".repeat(25));
        assert_eq!(
            line_query(&index, &code, 1),
            json!([
                {"line": 1, "startColumn": 10, "endColumn": 15},
                {"line": 2, "startColumn": 0, "endColumn": 1}
            ])
        );
        assert_eq!(line_query(&index, &code, 2), json!([]));
    }

    #[test]
    fn test_commands_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("out.js.map");
        let generated = dir.path().join("out.js");
        std::fs::write(
            &map,
            r#"{"version":3,"sources":["Demo.tsx"],"names":[],"mappings":"yBAAU"}"#,
        )
        .unwrap();
        std::fs::write(&generated, "x".repeat(30)).unwrap();

        assert!(forward(&map, "Demo.tsx", 1, 10).is_ok());
        assert!(reverse(&map, 1, 25).is_ok());
        assert!(line(&map, &generated, 1).is_ok());
        assert!(line(&map, &dir.path().join("missing.js"), 1).is_err());
    }
}
