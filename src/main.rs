//! `muniops`: the operator CLI over the decision-support core. Thin by
//! design — every subcommand delegates to `muniops::jobmanager::JobManager`
//! or `muniops::infrastructure::config::ConfigLoader`, the same services
//! `muniops-server` exposes over HTTP.

use anyhow::Result;
use clap::Parser;

use muniops::cli::commands::{self, Command};

#[derive(Parser, Debug)]
#[command(name = "muniops", version, about = "Municipal multi-agent decision-support service")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit machine-readable JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::dispatch(cli.command, cli.json).await
}
