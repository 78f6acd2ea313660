use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::args::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MappingKind {
    Request,
    Response,
    Error,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a stored mapping and print the response envelope.
    Execute {
        key: String,
        #[command(flatten)]
        mappings: MappingsArgs,
        #[command(flatten)]
        call: CallArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check a mapping document without running it.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply one of a mapping's transforms to a payload, offline.
    Transform {
        path: PathBuf,
        #[arg(long)]
        payload: Option<PathBuf>,
        #[arg(long = "mapping", value_enum, default_value_t = MappingKind::Request)]
        kind: MappingKind,
        #[command(flatten)]
        output: OutputArgs,
    },
}
