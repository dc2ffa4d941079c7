//! CLI command definitions and handlers.

pub mod config;
pub mod health;
pub mod query;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit, inspect, and cancel decision-support queries
    Query(query::QueryArgs),
    /// Inspect and validate the loaded configuration
    Config(config::ConfigArgs),
    /// Check Job Manager and database health
    Health,
}

pub async fn dispatch(command: Command, json_mode: bool) -> Result<()> {
    match command {
        Command::Query(args) => query::execute(args, json_mode).await,
        Command::Config(args) => config::execute(args, json_mode),
        Command::Health => health::execute(json_mode).await,
    }
}
