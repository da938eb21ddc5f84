//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Trellis -- dependency inventory collector for multi-module builds.
///
/// Use `trellis <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "trellis", version, about, long_about = None)]
pub struct Cli {
    /// Path to the trellis.toml configuration file.
    #[arg(short, long, global = true, default_value = "trellis.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the dependency inventory from a reactor manifest.
    Collect(CollectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- collect ----

/// Collect the dependency inventory and write an update request.
#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Reactor manifest describing modules and their resolved dependency graphs.
    #[arg(default_value = "reactor.json")]
    pub manifest: PathBuf,

    /// Directory for the update request file (overrides service.output_dir).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Merge all modules into one flat project.
    ///
    /// Rejected when the config file enables `collector.preserve_module_info`.
    #[arg(long, conflicts_with = "preserve_module_info")]
    pub aggregate: bool,

    /// Merge all modules into one project, keeping each module as a node.
    ///
    /// Rejected when the config file enables `collector.aggregate_modules`.
    #[arg(long)]
    pub preserve_module_info: bool,

    /// Skip modules whose dependency graph failed to resolve instead of aborting.
    #[arg(long)]
    pub tolerate_resolution_errors: bool,

    /// Collect and summarize without writing the update request.
    #[arg(long)]
    pub dry_run: bool,
}

// ---- config ----

/// Manage trellis configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, collector, service).
        #[arg(long)]
        section: Option<String>,
    },
}
