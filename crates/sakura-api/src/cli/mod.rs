//! CLI command definitions for the `sakura` binary.
//!
//! Uses clap derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay slash-command prompts to a streaming chat model.
#[derive(Parser)]
#[command(name = "sakura", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interaction webhook server.
    Serve {
        /// Port to listen on (overrides config and SAKURA_PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config and SAKURA_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Path to config.toml (defaults to ~/.sakura/config.toml).
        #[arg(short, long, env = "SAKURA_CONFIG")]
        config: Option<PathBuf>,

        /// Export spans to stdout through OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
