//! Job Manager's record of one submitted request (SPEC_FULL §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::request::{AgentType, Request};
use super::state::PipelineOutput;

/// Monotonic job lifecycle: `queued → running → {succeeded, failed,
/// cancelled}` (SPEC_FULL §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// A structured error payload for a `failed` job (SPEC_FULL §6 "Exit
/// codes and error signaling": a failed job is not itself an HTTP
/// failure, it carries this field instead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobErrorPayload {
    pub kind: String,
    pub message: String,
}

/// A handle shared between the Job Manager and the running pipeline task
/// so the caller can request cancellation without owning the task.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub agent_type: AgentType,
    pub request: Request,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<PipelineOutput>,
    pub error: Option<JobErrorPayload>,
    #[serde(skip)]
    pub cancellation: CancellationFlag,
}

impl Job {
    #[must_use]
    pub fn new(id: Uuid, agent_type: AgentType, request: Request) -> Self {
        Self {
            id,
            agent_type,
            request,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
            cancellation: CancellationFlag::new(),
        }
    }
}
