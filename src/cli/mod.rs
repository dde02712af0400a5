//! CLI entry point for roci-stream.

pub mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// roci-stream CLI
#[derive(Parser, Debug)]
#[command(name = "roci-stream", version, about = "Replay and inspect streamed agent runs")]
pub struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. `roci_stream=debug`
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON-lines event capture and print the resulting messages
    Replay(ReplayArgs),
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Capture file, one `{"event": ..., "data": ...}` frame per line
    pub path: PathBuf,

    /// JSON array of messages to start from (defaults to one empty placeholder)
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Reducer config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parent message id for the run messages
    #[arg(long)]
    pub parent_message_id: Option<String>,

    /// Conversation id for the run messages
    #[arg(long)]
    pub conversation_id: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

/// Install a stderr tracing subscriber.
pub fn init_logging(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
