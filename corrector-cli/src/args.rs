use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct MappingsArgs {
    /// Directory holding `<key>.json|yaml|yml` mapping documents.
    #[arg(long, env = "CORRECTOR_MAPPINGS_DIR", default_value = ".")]
    pub mappings: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Per-attempt timeout in milliseconds when the mapping sets none.
    #[arg(long, env = "CORRECTOR_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    /// Reject auth overrides even when the stored auth type is NONE.
    #[arg(long)]
    pub strict_auth_override: bool,
    /// Append one JSON line per call to this file.
    #[arg(long, env = "CORRECTOR_AUDIT_LOG")]
    pub audit_log: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CallArgs {
    #[arg(long)]
    pub payload: Option<PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_fields: Vec<String>,
    #[arg(long)]
    pub method: Option<corrector_core::HttpMethod>,
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,
    #[arg(long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,
    #[arg(long)]
    pub operation: Option<String>,
    /// JSON or YAML file holding an `authConfig` object.
    #[arg(long)]
    pub auth_override: Option<PathBuf>,
}
