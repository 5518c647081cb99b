/*
 * protocol.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Messages exchanged with the compile worker.
 */

use inspector_source_map::MapPayload;
use serde::{Deserialize, Serialize};

/// Request body sent to the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub code: String,
    pub filename: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Response body sent back by the worker
///
/// Exactly one of `code` and `error` is set. `time` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub code: Option<String>,
    pub error: Option<String>,
    pub time: f64,
    pub map: Option<MapPayload>,
}

/// A message tagged with the sequence number of the job it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub sequence: u64,
    pub message: T,
}

/// One submission of the current source text
#[derive(Debug, Clone, PartialEq)]
pub struct CompileJob {
    pub source_text: String,
    pub file_name: String,
    pub options: serde_json::Value,
    pub sequence: u64,
}

impl CompileJob {
    pub fn into_envelope(self) -> Envelope<WorkerRequest> {
        Envelope {
            sequence: self.sequence,
            message: WorkerRequest {
                code: self.source_text,
                filename: self.file_name,
                options: self.options,
            },
        }
    }
}

/// The outcome of one compile job
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    /// Absent when the transform failed
    pub generated_code: Option<String>,
    /// Parsed lazily; a malformed payload only disables highlighting
    pub source_map: Option<MapPayload>,
    pub diagnostic: Option<String>,
    pub elapsed_ms: f64,
    pub sequence: u64,
}

impl CompileResult {
    pub fn is_success(&self) -> bool {
        self.diagnostic.is_none()
    }
}

impl From<Envelope<WorkerResponse>> for CompileResult {
    fn from(envelope: Envelope<WorkerResponse>) -> Self {
        let Envelope { sequence, message } = envelope;
        CompileResult {
            generated_code: message.code,
            source_map: message.map,
            diagnostic: message.error,
            elapsed_ms: message.time,
            sequence,
        }
    }
}
