/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Live compilation pipeline for the transform inspector
//!
//! Edits to a single source file are debounced into compile jobs, run one
//! at a time on a dedicated worker thread, and only the result of the most
//! recent job is ever applied. Each applied result refreshes the source map
//! index that links the editor cursor to the generated code.
//!
//! The pieces, bottom up:
//! - [`Transformer`]: the seam to whatever performs the transform
//!   ([`CommandTransformer`] runs an external program)
//! - [`CompileWorker`]: the worker thread and its request/response channels
//! - [`SubmissionController`]: debouncing, sequencing and staleness checks
//! - [`PositionSync`]: cursor to [`Highlights`] via the current map
//! - [`InspectorSession`]: all of the above plus rendered markup, driven
//!   by [`SessionCommand`]s

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod markup;
pub mod orchestrator;
pub mod protocol;
pub mod session;
pub mod transform;
pub mod worker;

pub use command::CommandTransformer;
pub use config::{InspectorConfig, TransformCommand};
pub use controller::{ControllerEvent, ControllerState, SubmissionController};
pub use error::{Error, Result};
pub use markup::{MarkupRenderer, PlainMarkupRenderer, RenderError, render_or_fallback};
pub use orchestrator::{Highlights, PositionSync};
pub use protocol::{CompileJob, CompileResult, Envelope, WorkerRequest, WorkerResponse};
pub use session::{InspectorSession, Phase, SessionCommand, Status, ViewState};
pub use transform::{TransformError, TransformOptions, TransformOutput, Transformer, TransformerLoader};
pub use worker::CompileWorker;
