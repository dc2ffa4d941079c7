//! Job Manager (SPEC_FULL §4.6): accepts a `Request`, dispatches it to the
//! right department's `AgentPipeline`, runs it as a background task under
//! a wall-clock cap, and exposes Submit/Get/Cancel. Grounded on the
//! teacher's `application/swarm_orchestrator.rs` background-task-loop
//! shape, narrowed to one task per job instead of a polling queue, since
//! each job here is independent and has no dependency graph to schedule.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use governor::clock::{Clock, DefaultClock};
use governor::{Quota, RateLimiter};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::coordinator::Coordinator;
use crate::domain::error::{JobError, PipelineError};
use crate::domain::models::{
    AgentType, CancellationFlag, Job, JobErrorPayload, JobStatus, RateLimitConfig, Request,
};
use crate::pipeline::{AgentPipeline, RunOutcome};

type DirectRateLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, DefaultClock>;

/// Owns one `AgentPipeline` per department and the in-memory job table.
/// A `DatabasePool`-backed persistent job table is not part of SPEC_FULL
/// (jobs are a run's bookkeeping, not the audited record — that's the
/// `agent_decisions` table the pipeline itself writes at Phase 11).
pub struct JobManager {
    pipelines: HashMap<AgentType, Arc<AgentPipeline>>,
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
    job_timeout: Duration,
    rate_limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl JobManager {
    /// # Panics
    /// If `rate_limit.requests_per_second` or `burst_size` is zero.
    #[must_use]
    pub fn new(
        pipelines: HashMap<AgentType, Arc<AgentPipeline>>,
        job_timeout_secs: u64,
        rate_limit: &RateLimitConfig,
    ) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rps = NonZeroU32::new(rate_limit.requests_per_second.max(1.0) as u32)
            .unwrap_or_else(|| NonZeroU32::new(1).expect("1 is nonzero"));
        let burst = NonZeroU32::new(rate_limit.burst_size.max(1)).unwrap_or_else(|| NonZeroU32::new(1).expect("1 is nonzero"));
        let quota = Quota::per_second(rps).allow_burst(burst);

        Self {
            pipelines,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            job_timeout: Duration::from_secs(job_timeout_secs),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            clock: DefaultClock::default(),
        }
    }

    /// Submit: dispatches via the static request-type map, creates a
    /// `queued` job, and spawns its pipeline run in the background
    /// (SPEC_FULL §4.6 "Submit"). Rejects when the submission rate limit
    /// is exceeded.
    pub async fn submit(&self, request: Request) -> Result<Uuid, JobError> {
        if let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            let retry_after_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            return Err(JobError::RateLimited { retry_after_ms });
        }

        let agent_type = Coordinator::dispatch(&request.request_type);
        let job = Job::new(Uuid::new_v4(), agent_type, request.clone());
        let job_id = job.id;
        let cancellation = job.cancellation.clone();

        self.jobs.write().await.insert(job_id, job);

        let Some(pipeline) = self.pipelines.get(&agent_type).cloned() else {
            self.fail_job(job_id, "no_pipeline", &format!("no pipeline registered for {agent_type}")).await;
            return Ok(job_id);
        };

        self.set_running(job_id).await;

        let jobs = Arc::clone(&self.jobs);
        let timeout = self.job_timeout;
        tokio::spawn(async move {
            info!(job_id = %job_id, agent = %agent_type, "job started");
            let outcome = tokio::time::timeout(timeout, pipeline.run(job_id, request, &cancellation)).await;

            let mut guard = jobs.write().await;
            let Some(job) = guard.get_mut(&job_id) else { return };

            match outcome {
                Ok(Ok(RunOutcome::Completed(output))) => {
                    job.status = JobStatus::Succeeded;
                    job.result = Some(output);
                }
                Ok(Ok(RunOutcome::Cancelled)) => {
                    job.status = JobStatus::Cancelled;
                }
                Ok(Err(e)) => {
                    warn!(job_id = %job_id, error = %e, "job failed");
                    job.status = JobStatus::Failed;
                    job.error = Some(error_payload(&e));
                }
                Err(_) => {
                    error!(job_id = %job_id, "job exceeded wall-clock budget");
                    job.status = JobStatus::Failed;
                    job.error = Some(error_payload(&PipelineError::JobTimeout));
                }
            }
            job.finished_at = Some(Utc::now());
        });

        Ok(job_id)
    }

    /// Get: a snapshot of the job's current state (SPEC_FULL §4.6 "Get").
    pub async fn get(&self, job_id: Uuid) -> Result<Job, JobError> {
        self.jobs.read().await.get(&job_id).cloned().ok_or(JobError::NotFound(job_id))
    }

    /// Cancel: requests cancellation via the job's `CancellationFlag`.
    /// The pipeline observes this at its next suspension point and the
    /// background task transitions the job to `cancelled` itself
    /// (SPEC_FULL §4.6 "Cancel", §5 "Cancellation and timeouts").
    pub async fn cancel(&self, job_id: Uuid) -> Result<(), JobError> {
        let guard = self.jobs.read().await;
        let job = guard.get(&job_id).ok_or(JobError::NotFound(job_id))?;
        if job.status.is_terminal() {
            return Err(JobError::AlreadyTerminal(job_id));
        }
        job.cancellation.request();
        Ok(())
    }

    async fn set_running(&self, job_id: Uuid) {
        if let Some(job) = self.jobs.write().await.get_mut(&job_id) {
            job.status = JobStatus::Running;
        }
    }

    async fn fail_job(&self, job_id: Uuid, kind: &str, message: &str) {
        if let Some(job) = self.jobs.write().await.get_mut(&job_id) {
            job.status = JobStatus::Failed;
            job.error = Some(JobErrorPayload { kind: kind.to_string(), message: message.to_string() });
            job.finished_at = Some(Utc::now());
        }
    }
}

fn error_payload(e: &PipelineError) -> JobErrorPayload {
    let kind = match e {
        PipelineError::InvalidInput(_) => "invalid_input",
        PipelineError::MaxRetriesExceeded(_) => "max_retries_exceeded",
        PipelineError::HumanRejection(_) => "human_rejection",
        PipelineError::JobTimeout => "job_timeout",
        PipelineError::Internal(_) => "internal",
    };
    JobErrorPayload { kind: kind.to_string(), message: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::AutoApproveChannel;
    use crate::domain::models::RequestType;
    use crate::infrastructure::context_store::HttpContextStore;
    use crate::infrastructure::database::{CoordinationRepositoryImpl, DatabasePool};
    use crate::infrastructure::database::AuditRepositoryImpl;
    use crate::llm::LlmAdapter;
    use crate::domain::models::{ContextStoreConfig, LlmConfig, LlmFlags, RetryConfig};
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    async fn make_manager() -> JobManager {
        let db = DatabasePool::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let coordination_repo = Arc::new(CoordinationRepositoryImpl::new(db.pool()));
        let audit_repo: Arc<dyn crate::domain::ports::AuditRepository> =
            Arc::new(AuditRepositoryImpl::new(db.pool()));
        let human_channel = Arc::new(AutoApproveChannel);
        let coordinator = Arc::new(Coordinator::new(coordination_repo, human_channel, 24, 50_00_000, 3_00_00_000));

        let context_store: Arc<dyn crate::domain::ports::ContextStore> =
            Arc::new(HttpContextStore::new(&ContextStoreConfig::default()));
        let oracle: Arc<dyn crate::domain::ports::LlmOracle> =
            Arc::new(crate::llm::HttpLlmOracle::new(LlmConfig::default()));
        let llm = Arc::new(LlmAdapter::new(oracle, &LlmConfig::default(), &RetryConfig::default()));

        let mut pipelines: HashMap<AgentType, Arc<AgentPipeline>> = HashMap::new();
        for agent in AgentType::all() {
            pipelines.insert(
                agent,
                Arc::new(AgentPipeline::new(
                    agent,
                    Arc::clone(&context_store),
                    Arc::clone(&llm),
                    Arc::clone(&coordinator),
                    Arc::clone(&audit_repo),
                    LlmFlags::all_disabled(),
                    0.7,
                    3,
                )),
            );
        }

        let rate_limit = RateLimitConfig { requests_per_second: 100.0, burst_size: 100 };
        JobManager::new(pipelines, 5, &rate_limit)
    }

    fn sample_request() -> Request {
        Request {
            request_type: RequestType::new("capacity_query"),
            location: "Ward 4".into(),
            originator: "clerk-1".into(),
            estimated_cost: None,
            resources_needed: BTreeSet::new(),
            fields: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn submit_then_get_reaches_a_terminal_status() {
        let manager = make_manager().await;
        let job_id = manager.submit(sample_request()).await.unwrap();

        for _ in 0..50 {
            let job = manager.get(job_id).await.unwrap();
            if job.status.is_terminal() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job never reached a terminal status");
    }

    #[tokio::test]
    async fn get_unknown_job_errors() {
        let manager = make_manager().await;
        assert!(matches!(manager.get(Uuid::new_v4()).await, Err(JobError::NotFound(_))));
    }

    #[tokio::test]
    async fn cancel_unknown_job_errors() {
        let manager = make_manager().await;
        assert!(matches!(manager.cancel(Uuid::new_v4()).await, Err(JobError::NotFound(_))));
    }
}
