//! Watch command - live inspection of a file on disk
//!
//! Every change to the file becomes an edit in an inspector session; every
//! new view prints a status line and the current highlights.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use inspector_pipeline::{
    CommandTransformer, InspectorSession, PlainMarkupRenderer, SessionCommand, TransformError,
    Transformer, ViewState,
};
use inspector_source_map::Position;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebouncedEvent, Debouncer, new_debouncer};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Batches the several events a single save produces
const FS_DEBOUNCE_MS: u64 = 50;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub cursor: Option<Position>,
    pub transform: Vec<String>,
}

pub fn execute(args: WatchArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_watch(args))
}

async fn run_watch(args: WatchArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let transformer = super::resolve_transform(&args.transform, &config)?;
    let path = args
        .file
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", args.file.display()))?;
    let initial_text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let session = InspectorSession::start(
        &config,
        loader(transformer),
        Box::new(PlainMarkupRenderer),
        initial_text,
    )?;
    let (updates, mut views) = watch::channel(session.view().clone());
    let (commands, command_rx) = mpsc::unbounded_channel();
    if let Some(cursor) = args.cursor {
        commands.send(SessionCommand::MoveCursor(cursor))?;
    }
    let session_task = tokio::spawn(session.run(command_rx, updates));

    let mut watcher = FileWatcher::new(&path)?;
    info!(path = %path.display(), "Watching for changes");

    loop {
        tokio::select! {
            changed = watcher.recv() => match changed {
                Some(()) => match std::fs::read_to_string(&path) {
                    Ok(text) => commands.send(SessionCommand::Edit(text))?,
                    Err(e) => warn!(error = %e, "Failed to read changed file"),
                },
                None => break,
            },
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", report(&views.borrow_and_update()));
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    drop(commands);
    session_task.await??;
    Ok(())
}

fn loader(
    transformer: CommandTransformer,
) -> impl Fn() -> std::result::Result<Box<dyn Transformer>, TransformError> + Send + 'static {
    move || -> std::result::Result<Box<dyn Transformer>, TransformError> {
        Ok(Box::new(transformer.clone()))
    }
}

/// One status line, plus the highlights when there are any
fn report(view: &ViewState) -> String {
    let mut line = view.status.to_string();
    if let Some(ranges) = &view.highlights.original_ranges {
        let ranges: Vec<String> = ranges
            .iter()
            .map(|range| format!("{}:{}-{}", range.line, range.start_column, range.end_column))
            .collect();
        line.push_str(&format!(" [{}]", ranges.join(", ")));
    }
    line
}

/// Watches a single file for modifications
struct FileWatcher {
    /// The debouncer wrapping the underlying watcher
    _debouncer: Debouncer<notify::RecommendedWatcher>,

    event_rx: mpsc::UnboundedReceiver<()>,
}

impl FileWatcher {
    /// Watch `path`, which must be canonical
    fn new(path: &Path) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let target = path.to_path_buf();
        let dir = path
            .parent()
            .context("Watched file has no parent directory")?
            .to_path_buf();

        let mut debouncer = new_debouncer(
            Duration::from_millis(FS_DEBOUNCE_MS),
            move |res: std::result::Result<Vec<DebouncedEvent>, notify::Error>| match res {
                Ok(events) => {
                    if events.iter().any(|event| event.path == target) {
                        debug!(path = %target.display(), "File change detected");
                        if event_tx.send(()).is_err() {
                            debug!("Event receiver dropped, stopping watcher");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Filesystem watch error"),
            },
        )
        .context("Failed to create filesystem watcher")?;

        // Editors often replace the file, so watch its directory
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        Ok(Self {
            _debouncer: debouncer,
            event_rx,
        })
    }

    /// Wait for the next change; `None` once the watcher has stopped
    async fn recv(&mut self) -> Option<()> {
        self.event_rx.recv().await
    }
}
