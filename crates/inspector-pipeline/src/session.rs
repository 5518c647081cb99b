/*
 * session.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * An inspector session: one editable source file, its latest generated
 * code and the highlights linking the two.
 */

use std::fmt;

use inspector_source_map::{MapPayload, Position, SourceMapIndex};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::InspectorConfig;
use crate::controller::{ControllerEvent, ControllerState, SubmissionController};
use crate::error::{Error, Result};
use crate::markup::{MarkupRenderer, render_or_fallback};
use crate::orchestrator::{Highlights, PositionSync};
use crate::protocol::CompileResult;
use crate::transform::TransformerLoader;
use crate::worker::CompileWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Compiling,
    Failed,
    Success,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Compiling => write!(f, "Compiling"),
            Phase::Failed => write!(f, "Failed"),
            Phase::Success => write!(f, "Success"),
        }
    }
}

/// Status bar contents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub compiling: bool,
    /// Diagnostic of the latest authoritative compile, if it failed
    pub error: Option<String>,
    pub elapsed_ms: f64,
    /// Generated line currently highlighted
    pub mapped_line: Option<u32>,
}

impl Status {
    pub fn phase(&self) -> Phase {
        if self.compiling {
            Phase::Compiling
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Success
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase())?;
        if let Some(error) = &self.error
            && !self.compiling
        {
            write!(f, ": {error}")?;
        }
        if self.elapsed_ms > 0.0 {
            write!(f, " {}ms", self.elapsed_ms.round())?;
        }
        if let Some(line) = self.mapped_line {
            write!(f, " Mapped: {line}")?;
        }
        Ok(())
    }
}

/// Everything a front end needs to draw the inspector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub file_name: String,
    pub source_text: String,
    pub source_markup: String,
    /// Output of the last successful compile
    pub generated_code: String,
    pub output_markup: String,
    pub status: Status,
    pub highlights: Highlights,
}

/// Input from the front end
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Edit(String),
    MoveCursor(Position),
    SetFileName(String),
    CompileNow,
}

/// Owns the controller, the position sync and the rendered view
pub struct InspectorSession {
    controller: SubmissionController,
    sync: PositionSync,
    renderer: Box<dyn MarkupRenderer>,
    language: String,
    view: ViewState,
}

impl InspectorSession {
    /// Create a session; the initial text is compiled after the debounce interval
    pub fn new(
        config: &InspectorConfig,
        worker: CompileWorker,
        renderer: Box<dyn MarkupRenderer>,
        initial_text: impl Into<String>,
    ) -> Self {
        let source_text = initial_text.into();
        let mut controller = SubmissionController::new(worker, config);
        controller.edit(source_text.clone());

        let view = ViewState {
            file_name: config.file_name.clone(),
            source_markup: render_or_fallback(renderer.as_ref(), &source_text, &config.language),
            source_text,
            generated_code: String::new(),
            output_markup: render_or_fallback(renderer.as_ref(), "", &config.language),
            status: Status::default(),
            highlights: Highlights::none(),
        };

        Self {
            controller,
            sync: PositionSync::new(config.file_name.clone()),
            renderer,
            language: config.language.clone(),
            view,
        }
    }

    /// Spawn a compile worker for `loader` and create a session on it
    pub fn start<L: TransformerLoader>(
        config: &InspectorConfig,
        loader: L,
        renderer: Box<dyn MarkupRenderer>,
        initial_text: impl Into<String>,
    ) -> Result<Self> {
        let worker = CompileWorker::spawn(loader)?;
        Ok(Self::new(config, worker, renderer, initial_text))
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    /// The source map of the last successful compile, if it had a usable one
    pub fn index(&self) -> Option<&SourceMapIndex> {
        self.sync.index()
    }

    pub fn handle_command(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Edit(text) => {
                self.view.source_markup = self.render(&text);
                self.view.source_text = text.clone();
                self.controller.edit(text);
            }
            SessionCommand::MoveCursor(position) => {
                self.sync.cursor_moved(position);
                self.refresh_highlights();
            }
            SessionCommand::SetFileName(name) => {
                self.view.file_name = name.clone();
                self.controller.set_file_name(name.clone());
                self.sync.set_source_name(name);
                self.refresh_highlights();
            }
            SessionCommand::CompileNow => {
                self.controller.compile_now()?;
                self.view.status.compiling = true;
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: ControllerEvent) -> Result<()> {
        match event {
            ControllerEvent::Submitted { .. } => self.view.status.compiling = true,
            ControllerEvent::Completed(result) => self.apply(result),
            ControllerEvent::Discarded { .. } => {}
            ControllerEvent::WorkerClosed => return Err(Error::WorkerClosed),
        }
        Ok(())
    }

    /// Process events until the next authoritative compile result is applied
    pub async fn settle(&mut self) -> Result<()> {
        loop {
            let event = self.controller.next_event().await;
            let completed = matches!(event, ControllerEvent::Completed(_));
            self.handle_event(event)?;
            if completed {
                return Ok(());
            }
        }
    }

    /// Drive the session from `commands`, publishing each new view on `updates`
    ///
    /// Returns when the command channel closes.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        updates: watch::Sender<ViewState>,
    ) -> Result<()> {
        info!(file_name = %self.view.file_name, "Inspector session started");
        updates.send_replace(self.view.clone());

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command)?,
                    None => break,
                },
                event = self.controller.next_event() => self.handle_event(event)?,
            }
            updates.send_if_modified(|current| {
                if *current == self.view {
                    false
                } else {
                    *current = self.view.clone();
                    true
                }
            });
        }

        debug!("Command channel closed, stopping session");
        self.controller.shutdown();
        Ok(())
    }

    fn apply(&mut self, result: CompileResult) {
        let status = &mut self.view.status;
        status.compiling = false;
        status.elapsed_ms = result.elapsed_ms;

        if let Some(diagnostic) = result.diagnostic {
            // The last good output stays on screen; its map no longer matches the source
            info!(sequence = result.sequence, "Compile failed");
            status.error = Some(diagnostic);
            self.sync.clear();
            self.refresh_highlights();
            return;
        }

        status.error = None;
        let code = result.generated_code.unwrap_or_default();
        let index = result.source_map.and_then(build_index);
        info!(
            sequence = result.sequence,
            elapsed_ms = result.elapsed_ms,
            mapped = index.is_some(),
            "Compile finished"
        );

        self.sync.replace(index, &code);
        self.view.output_markup = self.render(&code);
        self.view.generated_code = code;
        self.refresh_highlights();
    }

    fn refresh_highlights(&mut self) {
        let highlights = self.sync.highlights().clone();
        self.view.status.mapped_line = highlights.generated_line;
        self.view.highlights = highlights;
    }

    fn render(&self, code: &str) -> String {
        render_or_fallback(self.renderer.as_ref(), code, &self.language)
    }
}

fn build_index(payload: MapPayload) -> Option<SourceMapIndex> {
    match payload
        .into_source_map()
        .and_then(|map| SourceMapIndex::build(&map))
    {
        Ok(index) => Some(index),
        Err(err) => {
            warn!(error = %err, "Ignoring malformed source map");
            None
        }
    }
}
