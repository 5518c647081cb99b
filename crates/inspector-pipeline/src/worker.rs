/*
 * worker.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The compile worker: a dedicated thread that owns the transformer and
 * answers compile jobs in the order they were submitted.
 */

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{CompileJob, CompileResult, Envelope, WorkerRequest, WorkerResponse};
use crate::transform::{TransformError, TransformOptions, TransformOutput, Transformer, TransformerLoader};

/// Name of the worker thread, visible in debuggers and panic messages
pub const WORKER_THREAD_NAME: &str = "inspector-compile";

/// Handle to the compile worker thread
///
/// Jobs are processed strictly in submission order, one at a time. Dropping
/// the handle closes the request queue; the thread exits after the job it is
/// currently running.
pub struct CompileWorker {
    requests: mpsc::UnboundedSender<Envelope<WorkerRequest>>,
    responses: mpsc::UnboundedReceiver<Envelope<WorkerResponse>>,
    thread: Option<JoinHandle<()>>,
}

impl CompileWorker {
    /// Start the worker thread. The transformer is loaded on the first job.
    pub fn spawn<L: TransformerLoader>(loader: L) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                trace!("Compile worker started");
                run_worker(&loader, request_rx, response_tx);
                trace!("Compile worker finished");
            })
            .map_err(Error::WorkerSpawn)?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
            thread: Some(thread),
        })
    }

    /// Enqueue a job without waiting for its result
    pub fn submit(&self, job: CompileJob) -> Result<()> {
        self.requests
            .send(job.into_envelope())
            .map_err(|_| Error::WorkerClosed)
    }

    /// Wait for the next response, in submission order
    ///
    /// Returns `None` once the worker thread has exited. Cancel safe.
    pub async fn recv(&mut self) -> Option<CompileResult> {
        self.responses.recv().await.map(CompileResult::from)
    }

    /// Submit a job and wait for its own result, skipping earlier responses
    pub async fn compile(&mut self, job: CompileJob) -> Result<CompileResult> {
        let sequence = job.sequence;
        self.submit(job)?;

        loop {
            match self.recv().await {
                Some(result) if result.sequence == sequence => return Ok(result),
                Some(result) => debug!(sequence = result.sequence, "Skipping earlier response"),
                None => return Err(Error::WorkerClosed),
            }
        }
    }

    /// Close the request queue and wait for the thread to exit
    pub fn shutdown(self) {
        let CompileWorker {
            requests,
            responses,
            thread,
        } = self;
        drop(requests);
        drop(responses);

        if let Some(thread) = thread
            && thread.join().is_err()
        {
            warn!("Compile worker thread panicked");
        }
    }
}

fn run_worker(
    loader: &dyn TransformerLoader,
    mut requests: mpsc::UnboundedReceiver<Envelope<WorkerRequest>>,
    responses: mpsc::UnboundedSender<Envelope<WorkerResponse>>,
) {
    let mut transformer: Option<Box<dyn Transformer>> = None;

    while let Some(Envelope { sequence, message }) = requests.blocking_recv() {
        trace!(sequence, bytes = message.code.len(), "Compiling");

        let start = Instant::now();
        let outcome = compile_one(loader, &mut transformer, &message);
        let time = start.elapsed().as_secs_f64() * 1000.0;

        let response = match outcome {
            Ok(output) => WorkerResponse {
                code: Some(output.code),
                error: None,
                time,
                map: output.map,
            },
            Err(err) => {
                debug!(sequence, error = %err, "Transform failed");
                WorkerResponse {
                    code: None,
                    error: Some(err.to_string()),
                    time,
                    map: None,
                }
            }
        };

        if responses
            .send(Envelope {
                sequence,
                message: response,
            })
            .is_err()
        {
            debug!("Response receiver dropped, stopping compile worker");
            break;
        }
    }
}

fn compile_one(
    loader: &dyn TransformerLoader,
    slot: &mut Option<Box<dyn Transformer>>,
    request: &WorkerRequest,
) -> std::result::Result<TransformOutput, TransformError> {
    if slot.is_none() {
        debug!("Loading transformer");
        match loader.load() {
            Ok(transformer) => *slot = Some(transformer),
            Err(err) => {
                warn!(error = %err, "Failed to load transformer");
                return Err(err);
            }
        }
    }
    let Some(transformer) = slot.as_mut() else {
        return Err(TransformError::new("Transformer is not loaded"));
    };

    let options = TransformOptions {
        file_name: &request.filename,
        source_file_name: &request.filename,
        source_maps: true,
        plugin_options: &request.options,
    };

    match panic::catch_unwind(AssertUnwindSafe(|| {
        transformer.transform(&request.code, &options)
    })) {
        Ok(outcome) => outcome,
        Err(payload) => {
            // State after a panic is unknown; load a fresh transformer next time
            *slot = None;
            Err(TransformError::new(format!(
                "Transform panicked: {}",
                panic_message(payload.as_ref())
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
