//! CLI parse: clap types for Prefetch. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prefetch CLI - resolve the asynchronous dependencies of component trees
#[derive(Parser, Debug)]
#[command(name = "prefetch")]
#[command(about = "Resolve asynchronous dependencies of component trees before rendering")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every reachable dependency of a manifest tree
    Resolve {
        /// Manifest file (.json or .toml)
        manifest: PathBuf,
        /// Rehydration state from a prior run (snapshot or rehydration JSON)
        #[arg(long)]
        state: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Also print the rendered tree
        #[arg(long)]
        outline: bool,
        /// Write the resulting snapshot JSON to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List declared dependencies and report duplicate ids
    Check {
        /// Manifest file (.json or .toml)
        manifest: PathBuf,
    },
}
