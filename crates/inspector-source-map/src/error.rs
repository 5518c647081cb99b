//! Error types for source map parsing

/// Reasons a source map cannot be turned into an index
///
/// Every variant means the map as a whole is unusable. Lookups that simply
/// have no answer are not errors and are reported as `None`.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Malformed source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported source map version {0} (expected 3)")]
    UnsupportedVersion(u32),

    #[error("Malformed source map mappings: {0}")]
    Mappings(#[source] sourcemap::Error),

    #[error("Mapping position is out of range (line {line}, column {column})")]
    PositionOutOfRange { line: u32, column: u32 },

    #[error("Mapping references source #{index} but the map only declares {declared} sources")]
    SourceOutOfRange { index: u32, declared: usize },
}

pub type Result<T> = std::result::Result<T, MapError>;
