//! CLI argument definitions for the convergent binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use convergent::RegisterKind;

use crate::output::OutputFormat;

/// Register kind selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    /// Set of scalars built from add/remove operations
    Set,
    /// Last-writer-wins register
    Lww,
    /// Multi-value register that keeps concurrent writes
    Mv,
    /// Counter accumulating increments
    Counter,
}

impl From<Kind> for RegisterKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Set => RegisterKind::Set,
            Kind::Lww => RegisterKind::Lww,
            Kind::Mv => RegisterKind::Mv,
            Kind::Counter => RegisterKind::Counter,
        }
    }
}

/// Convergent sets and registers over a versioned tree
#[derive(Parser, Debug)]
#[command(name = "convergent")]
#[command(about = "Convergent: replicated sets and registers over a versioned tree store")]
#[command(version)]
pub struct Cli {
    /// State file holding the committed tree
    #[arg(
        short,
        long,
        default_value = "convergent.json",
        env = "CONVERGENT_STATE",
        global = true
    )]
    pub state: PathBuf,

    /// JSON store configuration file
    #[arg(short, long, env = "CONVERGENT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        short,
        long,
        default_value = "human",
        env = "CONVERGENT_FORMAT",
        global = true
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a node and tag it with a register kind
    Init(InitArgs),
    /// Add a value to a set
    Add(ValueArgs),
    /// Remove a value from a set
    Remove(ValueArgs),
    /// Write a last-writer-wins register
    Update(ValueArgs),
    /// Write the value of a multi-value register directly
    Assign(AssignArgs),
    /// Add a delta to a counter
    Increment(IncrementArgs),
    /// Show the committed node at a path
    Show(ShowArgs),
    /// Replay concurrent writer scenarios on a scratch store
    Demo,
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Absolute node path, e.g. /doc/tags
    pub path: String,

    /// Register kind to tag the node with
    #[arg(short, long)]
    pub kind: Kind,
}

/// Arguments for commands taking one value
#[derive(clap::Args, Debug)]
pub struct ValueArgs {
    /// Absolute node path
    pub path: String,

    /// Value: true/false, an integer, an RFC 3339 date, or a string.
    /// Wrap in double quotes to force a string.
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

/// Arguments for the assign command
#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    /// Absolute node path
    pub path: String,

    /// Values of one type, stored as an array
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub values: Vec<String>,
}

/// Arguments for the increment command
#[derive(clap::Args, Debug)]
pub struct IncrementArgs {
    /// Absolute node path
    pub path: String,

    /// Amount to add; may be negative
    #[arg(allow_hyphen_values = true)]
    pub delta: i64,
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Absolute node path
    #[arg(default_value = "/")]
    pub path: String,
}
