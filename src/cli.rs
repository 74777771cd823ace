//! Command-line arguments for the `brokerday` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::TaskType;

#[derive(Debug, Parser)]
#[command(
    name = "brokerday",
    version,
    arg_required_else_help = true,
    about = "Plan a mortgage broker's day and carry out the tasks",
    after_help = "Environment:\n  BROKERDAY_CONFIG   Config file (default ~/.brokerday/config.json)\n  RUST_LOG           Log filter (default info)"
)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Plan the day and execute every task
    Run {
        /// Only print tasks of this type (email, calendar, crm). Execution is unaffected.
        #[arg(long = "type", value_name = "TYPE")]
        filter: Option<TaskType>,
    },
    /// Generate and print the plan without executing it
    Plan,
    /// Show the completion log, newest first
    History,
    /// List client email addresses
    Clients,
    /// Email today's summary
    Digest {
        /// Recipient address
        #[arg(long, value_name = "EMAIL")]
        to: String,
    },
}
