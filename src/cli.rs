//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// promgate - namespaced metrics gathering with an optional Graphite bridge
#[derive(Parser)]
#[command(name = "promgate")]
#[command(version)]
#[command(about = "Namespaced metrics gathering with an optional Graphite bridge", long_about = None)]
pub struct Cli {
    /// Configuration file (default: promgate.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the metrics service until Ctrl+C (default)
    Run,

    /// Gather once and print the text exposition
    Gather,

    /// Print the default configuration as TOML
    SampleConfig,
}
