//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Track time across named streams of work.
///
/// Several streams can run at once; the wall clock counts overlapping time
/// only once.
#[derive(Debug, Parser)]
#[command(name = "urd", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List streams with their elapsed time (the default).
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a new stream.
    Add {
        /// Display name of the stream.
        name: String,

        /// Insert at this 0-based position instead of appending.
        #[arg(long, allow_negative_numbers = true)]
        at: Option<isize>,
    },

    /// Delete a stream.
    #[command(visible_alias = "rm")]
    Delete {
        /// Stream ID, list position, or name.
        stream: String,

        /// Delete even if the stream has recorded time.
        #[arg(short, long)]
        yes: bool,
    },

    /// Start or stop a stream.
    Toggle {
        /// Stream ID, list position, or name.
        stream: String,
    },

    /// Stop all running streams, remembering them for `continue`.
    Stop,

    /// Resume the streams stopped by the last `stop`.
    Continue,

    /// Bank the running time of active streams without stopping them.
    Checkpoint,

    /// Show a summary of the current tracking state.
    Status,
}
