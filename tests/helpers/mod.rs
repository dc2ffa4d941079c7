//! Shared fixtures for the end-to-end scenario tests (spec §8 "Concrete
//! scenarios"): an in-memory `ContextStore` double, and a builder that
//! wires one `Coordinator` + one `AgentPipeline` per department the same
//! way `muniops::jobmanager::JobManager` does.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use muniops::coordinator::{AutoApproveChannel, Coordinator};
use muniops::domain::error::ToolError;
use muniops::domain::models::{
    AgentType, ApprovalOption, CancellationFlag, ContextSnapshot, HumanApprovalDecision, HumanApprovalRequest,
    LlmConfig, LlmFlags, Request, RetryConfig,
};
use muniops::domain::ports::{ContextStore, HumanApprovalChannel};
use muniops::infrastructure::database::{AuditRepositoryImpl, CoordinationRepositoryImpl, DatabasePool};
use muniops::llm::{HttpLlmOracle, LlmAdapter};
use muniops::pipeline::{AgentPipeline, RunOutcome};

/// A human channel that never approves: every conflict comes back
/// deferred, so `Coordinator::resolve_escalation` reports
/// `CheckpointOutcome::Escalate` instead of admitting another active
/// decision. Models an unstaffed approval queue (SPEC_FULL §4.2), the
/// mirror image of `AutoApproveChannel`.
pub struct AlwaysDeferChannel;

#[async_trait]
impl HumanApprovalChannel for AlwaysDeferChannel {
    async fn request_approval(&self, request: HumanApprovalRequest) -> HumanApprovalDecision {
        HumanApprovalDecision {
            option: ApprovalOption::Defer,
            approver: "test-defer".into(),
            notes: format!("deferred {} conflicts", request.conflicts.len()),
            timestamp: Utc::now(),
        }
    }
}

/// A `ContextStore` whose snapshot is fixed per test instead of fetched
/// over HTTP, so scenarios can pin exactly the observation inputs the
/// Tool Layer reads at Phase 7/8.
pub struct FixedContextStore {
    pub snapshots: BTreeMap<String, ContextSnapshot>,
    pub unavailable: bool,
}

impl FixedContextStore {
    pub fn new() -> Self {
        Self { snapshots: BTreeMap::new(), unavailable: false }
    }

    pub fn with_snapshot(mut self, location: &str, snapshot: ContextSnapshot) -> Self {
        self.snapshots.insert(location.to_string(), snapshot);
        self
    }

    pub fn unreachable() -> Self {
        Self { snapshots: BTreeMap::new(), unavailable: true }
    }
}

#[async_trait]
impl ContextStore for FixedContextStore {
    async fn load_snapshot(&self, location: &str) -> Result<ContextSnapshot, ToolError> {
        if self.unavailable {
            return Err(ToolError::ContextUnavailable("context store offline".into()));
        }
        Ok(self.snapshots.get(location).cloned().unwrap_or_default())
    }
}

pub struct Harness {
    pub pipelines: HashMap<AgentType, Arc<AgentPipeline>>,
    pub coordinator: Arc<Coordinator>,
    pub coordination_repo: Arc<CoordinationRepositoryImpl>,
}

impl Harness {
    /// All LLM call sites disabled: every scenario here exercises the
    /// deterministic fallback path, since no live LLM endpoint exists in
    /// a test run.
    pub async fn build(context_store: Arc<dyn ContextStore>, budget_ceiling_rupees: i64) -> Self {
        Self::build_with_channel(context_store, budget_ceiling_rupees, Arc::new(AutoApproveChannel)).await
    }

    /// Same wiring as `build`, but with the human-approval channel
    /// supplied by the caller instead of defaulting to `AutoApproveChannel`
    /// — needed by scenarios that exercise what happens when an
    /// escalation is *not* rubber-stamped.
    pub async fn build_with_channel(
        context_store: Arc<dyn ContextStore>,
        budget_ceiling_rupees: i64,
        human_channel: Arc<dyn HumanApprovalChannel>,
    ) -> Self {
        let db = DatabasePool::connect("sqlite::memory:").await.expect("connect");
        db.migrate().await.expect("migrate");

        let coordination_repo = Arc::new(CoordinationRepositoryImpl::new(db.pool()));
        let audit_repo: Arc<dyn muniops::domain::ports::AuditRepository> =
            Arc::new(AuditRepositoryImpl::new(db.pool()));
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&coordination_repo) as Arc<dyn muniops::domain::ports::CoordinationRepository>,
            human_channel,
            24,
            50_00_000,
            budget_ceiling_rupees,
        ));

        let oracle: Arc<dyn muniops::domain::ports::LlmOracle> =
            Arc::new(HttpLlmOracle::new(LlmConfig::default()));
        let llm = Arc::new(LlmAdapter::new(oracle, &LlmConfig::default(), &RetryConfig::default()));

        let mut pipelines = HashMap::new();
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

        Self { pipelines, coordinator, coordination_repo }
    }

    pub async fn run(&self, agent: AgentType, request: Request) -> RunOutcome {
        let pipeline = self.pipelines.get(&agent).expect("pipeline registered for every agent");
        pipeline
            .run(uuid::Uuid::new_v4(), request, &CancellationFlag::new())
            .await
            .expect("pipeline never returns Err for a well-formed request")
    }
}

pub fn request(request_type: &str, location: &str, fields: BTreeMap<String, serde_json::Value>) -> Request {
    Request {
        request_type: muniops::domain::models::RequestType::new(request_type),
        location: location.to_string(),
        originator: "clerk-1".to_string(),
        estimated_cost: None,
        resources_needed: Default::default(),
        fields,
    }
}
