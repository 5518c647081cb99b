//! Transform inspector CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use inspector_source_map::Position;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::parse_position;

#[derive(Parser)]
#[command(name = "inspector")]
#[command(version)]
#[command(about = "Inspect how a transform maps source positions to generated code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query a source map directly
    Map {
        #[command(subcommand)]
        query: MapQuery,
    },

    /// Show the highlights for a cursor position in the original file
    Highlight {
        /// Source map of the generated code
        #[arg(long)]
        map: PathBuf,

        /// The generated code the map describes
        #[arg(long)]
        generated: PathBuf,

        /// Name of the original file as recorded in the map
        #[arg(long, default_value = "Demo.tsx")]
        source: String,

        /// Cursor position in the original file (LINE:COLUMN, 1-based line)
        #[arg(long, value_parser = parse_position)]
        cursor: Position,
    },

    /// Compile a file once through a transform program
    Compile {
        /// File to compile
        file: PathBuf,

        /// Inspector config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the source map to this path
        #[arg(long)]
        map_out: Option<PathBuf>,

        /// Transform program and its arguments (overrides the config)
        #[arg(last = true)]
        transform: Vec<String>,
    },

    /// Recompile a file whenever it changes and report highlights
    Watch {
        /// File to watch
        file: PathBuf,

        /// Inspector config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cursor position in the watched file (LINE:COLUMN, 1-based line)
        #[arg(long, value_parser = parse_position)]
        cursor: Option<Position>,

        /// Transform program and its arguments (overrides the config)
        #[arg(last = true)]
        transform: Vec<String>,
    },
}

#[derive(Subcommand)]
enum MapQuery {
    /// Where did an original position land in the generated code
    Forward {
        #[arg(long)]
        map: PathBuf,

        /// Name of the original file as recorded in the map
        #[arg(long)]
        source: String,

        #[arg(long)]
        line: u32,

        #[arg(long)]
        column: u32,
    },

    /// Which original position does a generated position come from
    Reverse {
        #[arg(long)]
        map: PathBuf,

        #[arg(long)]
        line: u32,

        #[arg(long)]
        column: u32,
    },

    /// Original ranges covering a whole generated line
    Line {
        #[arg(long)]
        map: PathBuf,

        /// The generated code, used for the line's length
        #[arg(long)]
        generated: PathBuf,

        #[arg(long)]
        line: u32,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inspector=info,inspector_pipeline=info,inspector_source_map=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map { query } => match query {
            MapQuery::Forward {
                map,
                source,
                line,
                column,
            } => commands::map::forward(&map, &source, line, column),
            MapQuery::Reverse { map, line, column } => commands::map::reverse(&map, line, column),
            MapQuery::Line {
                map,
                generated,
                line,
            } => commands::map::line(&map, &generated, line),
        },
        Commands::Highlight {
            map,
            generated,
            source,
            cursor,
        } => commands::highlight::execute(&map, &generated, &source, cursor),
        Commands::Compile {
            file,
            config,
            map_out,
            transform,
        } => commands::compile::execute(commands::compile::CompileArgs {
            file,
            config,
            map_out,
            transform,
        }),
        Commands::Watch {
            file,
            config,
            cursor,
            transform,
        } => commands::watch::execute(commands::watch::WatchArgs {
            file,
            config,
            cursor,
            transform,
        }),
    }
}
