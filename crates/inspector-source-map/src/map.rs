//! The source map value produced by a transform

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A revision 3 source map, as emitted by a transform
///
/// This is an immutable value. Positions are only available through a
/// [`SourceMapIndex`](crate::SourceMapIndex) built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    /// Base64 VLQ encoded segment list
    pub mappings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
}

impl SourceMap {
    /// Parse a source map from its JSON text
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A source map as it travels across the worker boundary
///
/// Transforms hand back either the JSON text or an already parsed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapPayload {
    Object(SourceMap),
    Text(String),
}

impl MapPayload {
    pub fn into_source_map(self) -> Result<SourceMap> {
        match self {
            MapPayload::Object(map) => Ok(map),
            MapPayload::Text(json) => SourceMap::parse(&json),
        }
    }
}

impl From<SourceMap> for MapPayload {
    fn from(map: SourceMap) -> Self {
        MapPayload::Object(map)
    }
}
