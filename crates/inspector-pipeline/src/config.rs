/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Inspector configuration, loaded from TOML by the binary.
 */

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default quiet period after the last edit before a compile is submitted
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default identifier of the single in-memory file
pub const DEFAULT_FILE_NAME: &str = "Demo.tsx";

/// An external program that performs the transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Configuration for an inspector session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Passed to the transform as `filename` and used as the forward-lookup source
    pub file_name: String,

    pub debounce_ms: u64,

    /// Language id given to the markup renderer for both panes
    pub language: String,

    /// Opaque options forwarded to the transform unchanged
    pub plugin_options: serde_json::Value,

    pub transform: Option<TransformCommand>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            language: "tsx".to_string(),
            plugin_options: serde_json::Value::Object(serde_json::Map::new()),
            transform: None,
        }
    }
}

impl InspectorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
