/*
 * controller.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Debounced submission of compile jobs with stale result suppression.
 */

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use crate::config::InspectorConfig;
use crate::error::Result;
use crate::protocol::{CompileJob, CompileResult};
use crate::worker::CompileWorker;

/// Where the controller is between edits and results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// An edit arrived; a submission is scheduled
    PendingSubmit,
    /// The latest job has been submitted and its result not yet accepted
    InFlight,
}

/// Something the controller did while awaited
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The debounce interval elapsed and a job was sent to the worker
    Submitted { sequence: u64 },
    /// The result of the most recently submitted job
    Completed(CompileResult),
    /// A result superseded by a later submission was dropped
    Discarded { sequence: u64 },
    WorkerClosed,
}

/// Turns a stream of edits into compile jobs
///
/// Each edit restarts a quiet period; only when it elapses without further
/// edits is the current text submitted. Every job carries a sequence number
/// one greater than the previous job's, and only the result whose sequence
/// equals the most recently submitted one is ever accepted.
pub struct SubmissionController {
    worker: CompileWorker,
    debounce: Duration,
    source_text: String,
    file_name: String,
    options: serde_json::Value,
    deadline: Option<Instant>,
    next_sequence: u64,
    latest_submitted: Option<u64>,
    awaiting: bool,
}

impl SubmissionController {
    pub fn new(worker: CompileWorker, config: &InspectorConfig) -> Self {
        Self {
            worker,
            debounce: config.debounce(),
            source_text: String::new(),
            file_name: config.file_name.clone(),
            options: config.plugin_options.clone(),
            deadline: None,
            next_sequence: 1,
            latest_submitted: None,
            awaiting: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.awaiting {
            ControllerState::InFlight
        } else if self.deadline.is_some() {
            ControllerState::PendingSubmit
        } else {
            ControllerState::Idle
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Sequence number of the most recently submitted job
    pub fn latest_submitted(&self) -> Option<u64> {
        self.latest_submitted
    }

    /// Record new source text and restart the quiet period
    pub fn edit(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
        self.arm();
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
        self.arm();
    }

    pub fn set_options(&mut self, options: serde_json::Value) {
        self.options = options;
        self.arm();
    }

    /// Submit the current text immediately, cancelling any pending timer
    pub fn compile_now(&mut self) -> Result<u64> {
        self.deadline = None;
        self.submit()
    }

    /// Accept `result` if it belongs to the most recent submission
    ///
    /// Returns `None` for stale results, which must not touch any state.
    pub fn accept(&mut self, result: CompileResult) -> Option<CompileResult> {
        if self.latest_submitted != Some(result.sequence) {
            debug!(
                sequence = result.sequence,
                latest = ?self.latest_submitted,
                "Discarding stale compile result"
            );
            return None;
        }

        self.awaiting = false;
        Some(result)
    }

    /// Wait for the debounce deadline or the next worker response
    ///
    /// Cancel safe: dropping the future before it resolves loses nothing.
    pub async fn next_event(&mut self) -> ControllerEvent {
        let deadline = self.deadline;

        tokio::select! {
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                self.deadline = None;
                match self.submit() {
                    Ok(sequence) => ControllerEvent::Submitted { sequence },
                    Err(_) => ControllerEvent::WorkerClosed,
                }
            }
            response = self.worker.recv() => match response {
                Some(result) => {
                    let sequence = result.sequence;
                    match self.accept(result) {
                        Some(result) => ControllerEvent::Completed(result),
                        None => ControllerEvent::Discarded { sequence },
                    }
                }
                None => ControllerEvent::WorkerClosed,
            },
        }
    }

    /// Stop the worker thread, waiting for the job it is running
    pub fn shutdown(self) {
        self.worker.shutdown();
    }

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.debounce);
        trace!(debounce_ms = self.debounce.as_millis() as u64, "Compile scheduled");
    }

    fn submit(&mut self) -> Result<u64> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.worker.submit(CompileJob {
            source_text: self.source_text.clone(),
            file_name: self.file_name.clone(),
            options: self.options.clone(),
            sequence,
        })?;

        self.latest_submitted = Some(sequence);
        self.awaiting = true;
        debug!(
            sequence,
            file_name = %self.file_name,
            bytes = self.source_text.len(),
            "Submitted compile job"
        );
        Ok(sequence)
    }
}
