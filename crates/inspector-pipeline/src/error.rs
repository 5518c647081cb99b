/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for the compilation pipeline.
 */

use std::path::PathBuf;

use inspector_source_map::MapError;

/// Errors that can occur while running the compilation pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to spawn compile worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Compile worker has shut down")]
    WorkerClosed,

    #[error(transparent)]
    Map(#[from] MapError),
}

pub type Result<T> = std::result::Result<T, Error>;
