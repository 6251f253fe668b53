//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Command line client for the dsatrack problem tracker.
#[derive(Parser, Debug)]
#[command(name = "dsatrack")]
#[command(author, version = env!("DSATRACK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the tracker API
    #[arg(
        long,
        env = "DSATRACK_API_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub api_url: String,

    /// Accept a plain http API URL for any host, not just localhost
    #[arg(long, env = "DSATRACK_ALLOW_HTTP", global = true)]
    pub allow_http: bool,

    /// Token file (defaults to the platform data directory)
    #[arg(long, env = "DSATRACK_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Forget stored tokens when a refresh is rejected
    #[arg(long, global = true)]
    pub clear_on_expiry: bool,
}
