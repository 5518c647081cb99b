/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The transform seam: whatever turns source text into generated code
 * plus a source map.
 */

use inspector_source_map::MapPayload;

/// Options handed to a transform for one compile
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    pub file_name: &'a str,
    /// Name recorded in the map's `sources`; the worker sets it to `file_name`
    pub source_file_name: &'a str,
    /// Always true when called from the worker
    pub source_maps: bool,
    pub plugin_options: &'a serde_json::Value,
}

/// Successful transform output
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub code: String,
    pub map: Option<MapPayload>,
}

/// A transform failure, carried to the UI as a diagnostic string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A source-to-source transform that emits a source map
pub trait Transformer: Send {
    fn transform(
        &mut self,
        source: &str,
        options: &TransformOptions<'_>,
    ) -> Result<TransformOutput, TransformError>;
}

/// Produces the transformer the first time the worker needs it
///
/// A failed load is reported on the job that triggered it and retried on
/// the next job.
pub trait TransformerLoader: Send + 'static {
    fn load(&self) -> Result<Box<dyn Transformer>, TransformError>;
}

impl<F> TransformerLoader for F
where
    F: Fn() -> Result<Box<dyn Transformer>, TransformError> + Send + 'static,
{
    fn load(&self) -> Result<Box<dyn Transformer>, TransformError> {
        self()
    }
}
