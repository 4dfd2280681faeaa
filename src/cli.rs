use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "file-provider")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Resource provider managing filesystem files for declarative infrastructure tools", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (logs go to stderr)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve lifecycle requests, one JSON object per line on stdin/stdout
    Serve,

    /// Print the provider schema as JSON
    Schema,

    /// Handle a single request and print the response
    Invoke {
        /// Request JSON, or "-" to read it from stdin
        request: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
