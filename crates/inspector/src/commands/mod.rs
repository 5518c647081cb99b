//! Command implementations for the inspector CLI
//!
//! Each command module handles the CLI interface and delegates to
//! inspector-pipeline and inspector-source-map for the actual work.

use std::path::Path;

use anyhow::{Context, Result, bail};
use inspector_pipeline::{CommandTransformer, InspectorConfig};
use inspector_source_map::{Position, SourceMapIndex};

pub mod compile;
pub mod highlight;
pub mod map;
pub mod watch;

/// Parse a `LINE:COLUMN` cursor position (1-based line, 0-based column)
pub fn parse_position(value: &str) -> std::result::Result<Position, String> {
    let (line, column) = value
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COLUMN, got '{value}'"))?;
    let line: u32 = line
        .trim()
        .parse()
        .map_err(|e| format!("invalid line '{line}': {e}"))?;
    let column: u32 = column
        .trim()
        .parse()
        .map_err(|e| format!("invalid column '{column}': {e}"))?;
    if line == 0 {
        return Err("lines are 1-based".to_string());
    }
    Ok(Position::new(line, column))
}

pub fn load_index(path: &Path) -> Result<SourceMapIndex> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source map {}", path.display()))?;
    SourceMapIndex::from_json(&json)
        .with_context(|| format!("Invalid source map {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<InspectorConfig> {
    match path {
        Some(path) => Ok(InspectorConfig::load(path)?),
        None => Ok(InspectorConfig::default()),
    }
}

/// The transform to run: trailing arguments win over the config
pub fn resolve_transform(
    trailing: &[String],
    config: &InspectorConfig,
) -> Result<CommandTransformer> {
    if let Some((program, args)) = trailing.split_first() {
        return Ok(CommandTransformer::new(program.clone(), args.to_vec()));
    }
    match &config.transform {
        Some(command) => Ok(CommandTransformer::from_config(command)),
        None => bail!("No transform given; pass one after `--` or set [transform] in the config"),
    }
}
