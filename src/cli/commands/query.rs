//! Query CLI commands: submit a request and inspect/cancel a running
//! job, driving an in-process `JobManager` the same way `muniops-server`
//! drives one over HTTP.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::cli::runtime::bootstrap;
use crate::coordinator::Coordinator;
use crate::domain::models::{JobErrorPayload, JobStatus, Money, PipelineOutput, Request, RequestType};

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub command: QueryCommands,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Submit a new query
    Submit {
        /// Request type, e.g. capacity_query, inspection_request
        #[arg(long = "type")]
        request_type: String,
        /// Ward or site the request concerns
        #[arg(long)]
        location: String,
        /// Who filed the request
        #[arg(long)]
        originator: String,
        /// Estimated cost in whole rupees
        #[arg(long)]
        estimated_cost: Option<i64>,
        /// Resources needed, comma-separated
        #[arg(long, value_delimiter = ',')]
        resources_needed: Vec<String>,
        /// Extra type-specific fields as `key=value` JSON scalars
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    /// Get a job's current status
    Get {
        /// Job id returned by `submit`
        job_id: Uuid,
    },
    /// Get a terminal job's result payload
    Result {
        /// Job id returned by `submit`
        job_id: Uuid,
    },
    /// Request cancellation of a running job
    Cancel {
        /// Job id returned by `submit`
        job_id: Uuid,
    },
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected key=value, got {raw}"))?;
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

#[derive(Debug, serde::Serialize)]
pub struct SubmitOutput {
    pub job_id: Uuid,
    pub status: &'static str,
    pub agent_type: String,
}

impl CommandOutput for SubmitOutput {
    fn to_human(&self) -> String {
        format!("job {} queued for {}", self.job_id, self.agent_type)
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct JobOutput {
    pub id: Uuid,
    pub agent_type: String,
    pub status: String,
    pub result: Option<PipelineOutput>,
    pub error: Option<JobErrorPayload>,
}

impl CommandOutput for JobOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("job {}: {} ({})", self.id, self.status, self.agent_type)];
        if let Some(result) = &self.result {
            lines.push(format!("decision: {:?}", result.decision));
            lines.push(format!("reason: {}", result.reason));
        }
        if let Some(error) = &self.error {
            lines.push(format!("error [{}]: {}", error.kind, error.message));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: QueryArgs, json_mode: bool) -> Result<()> {
    let runtime = bootstrap().await.context("failed to initialize runtime")?;

    match args.command {
        QueryCommands::Submit { request_type, location, originator, estimated_cost, resources_needed, fields } => {
            let request_type = RequestType::new(&request_type);
            let agent_type = Coordinator::dispatch(&request_type);
            let request = Request {
                request_type,
                location,
                originator,
                estimated_cost: estimated_cost.map(Money::rupees),
                resources_needed: resources_needed.into_iter().collect::<BTreeSet<_>>(),
                fields: fields.into_iter().collect::<BTreeMap<_, _>>(),
            };
            let job_id = runtime.job_manager.submit(request).await.context("submit failed")?;
            output(&SubmitOutput { job_id, status: "queued", agent_type: agent_type.to_string() }, json_mode);
        }
        QueryCommands::Get { job_id } => {
            let job = runtime.job_manager.get(job_id).await.context("job not found")?;
            output(
                &JobOutput {
                    id: job.id,
                    agent_type: job.agent_type.to_string(),
                    status: format!("{:?}", job.status).to_lowercase(),
                    result: job.result,
                    error: job.error,
                },
                json_mode,
            );
        }
        QueryCommands::Result { job_id } => {
            let job = runtime.job_manager.get(job_id).await.context("job not found")?;
            if job.status != JobStatus::Succeeded {
                output(
                    &ActionOutput { success: false, message: format!("job is {:?}, no result yet", job.status) },
                    json_mode,
                );
                return Ok(());
            }
            output(
                &JobOutput {
                    id: job.id,
                    agent_type: job.agent_type.to_string(),
                    status: "succeeded".to_string(),
                    result: job.result,
                    error: None,
                },
                json_mode,
            );
        }
        QueryCommands::Cancel { job_id } => {
            runtime.job_manager.cancel(job_id).await.context("cancel failed")?;
            output(&ActionOutput { success: true, message: format!("cancellation requested for job {job_id}") }, json_mode);
        }
    }

    Ok(())
}
