//! Config CLI commands: show the effective configuration and validate
//! an on-disk YAML file before it's deployed.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (defaults + files + env)
    Show,
    /// Validate a configuration file without starting a job
    Validate {
        /// Path to a YAML config file
        path: String,
    },
}

struct ConfigOutput(Config);

impl serde::Serialize for ConfigOutput {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        format!(
            "confidence_threshold: {}\nmax_retries: {}\ncost_escalation_limit_rupees: {}\nconflict_window_hours: {}\njob_timeout_secs: {}\ndatabase.path: {}",
            self.0.confidence_threshold,
            self.0.max_retries,
            self.0.cost_escalation_limit_rupees,
            self.0.conflict_window_hours,
            self.0.job_timeout_secs,
            self.0.database.path,
        )
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}

pub fn execute(args: ConfigArgs, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load().context("failed to load configuration")?;
            output(&ConfigOutput(config), json_mode);
        }
        ConfigCommands::Validate { path } => {
            let config = ConfigLoader::load_from_file(&path).with_context(|| format!("failed to load {path}"))?;
            ConfigLoader::validate(&config).context("configuration is invalid")?;
            println!("{path} is valid");
        }
    }
    Ok(())
}
