//! Compile command - one-shot compile through the worker channel
//!
//! The generated code goes to stdout, the status line to stderr. A transform
//! failure exits with status 1.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use inspector_pipeline::{
    CommandTransformer, CompileJob, CompileResult, CompileWorker, TransformError, Transformer,
};
use inspector_source_map::SourceMapIndex;
use tracing::{info, warn};

/// Arguments for the compile command.
pub struct CompileArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub map_out: Option<PathBuf>,
    pub transform: Vec<String>,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_compile(args))
}

async fn run_compile(args: CompileArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let transformer = super::resolve_transform(&args.transform, &config)?;
    let source_text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let result = compile_once(
        transformer,
        CompileJob {
            source_text,
            file_name: config.file_name.clone(),
            options: config.plugin_options.clone(),
            sequence: 1,
        },
    )
    .await?;

    if let Some(diagnostic) = result.diagnostic {
        eprintln!("Failed: {diagnostic}");
        bail!("Transform failed");
    }

    let code = result.generated_code.unwrap_or_default();
    let map = match result.source_map.map(|payload| payload.into_source_map()) {
        Some(Ok(map)) => Some(map),
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring malformed source map");
            None
        }
        None => None,
    };
    if let Some(map) = &map {
        match SourceMapIndex::build(map) {
            Ok(index) => info!(segments = index.len(), "Source map decoded"),
            Err(e) => warn!(error = %e, "Source map segments are malformed"),
        }
        if let Some(path) = &args.map_out {
            std::fs::write(path, map.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    let mapped = map.is_some();

    println!("{code}");
    eprintln!(
        "Success {}ms{}",
        result.elapsed_ms.round(),
        if mapped { "" } else { " (no source map)" }
    );
    Ok(())
}

async fn compile_once(transformer: CommandTransformer, job: CompileJob) -> Result<CompileResult> {
    let mut worker = CompileWorker::spawn(
        move || -> std::result::Result<Box<dyn Transformer>, TransformError> {
            Ok(Box::new(transformer.clone()))
        },
    )?;
    let result = worker.compile(job).await?;
    worker.shutdown();
    Ok(result)
}
