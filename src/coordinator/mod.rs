//! The Coordinator (SPEC_FULL §4.2): Dispatch, CheckPlanConflicts, and
//! RecordOutcome over the single shared-mutable `CoordinationDecision`
//! table, serialized per `location`.

pub mod conflicts;
pub mod human_channel;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::error::CoordinatorError;
use crate::domain::models::{
    ApprovalOption, AgentType, CheckpointRequest, Conflict, CoordinationDecision, CoordinationStatus, Decision,
    HumanApprovalRequest, Money, RequestType, Urgency, Verdict,
};
use crate::domain::ports::{CoordinationRepository, HumanApprovalChannel};
use crate::config::agent_mapping;

pub use human_channel::{AutoApproveChannel, TerminalChannel};

/// What Phase 6 actually needs back, after any synchronous human-in-the-
/// loop resolution has already happened.
#[derive(Debug, Clone)]
pub enum CheckpointOutcome {
    Proceed { decision_id: Uuid },
    Retry { recommendations: Vec<String>, blocking_decisions: BTreeSet<Uuid> },
    Escalate,
    Rejected { reason: String },
}

pub struct Coordinator {
    coordination_repo: Arc<dyn CoordinationRepository>,
    human_channel: Arc<dyn HumanApprovalChannel>,
    conflict_window_hours: i64,
    cost_escalation_limit: Money,
    budget_ceiling: Money,
    location_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        coordination_repo: Arc<dyn CoordinationRepository>,
        human_channel: Arc<dyn HumanApprovalChannel>,
        conflict_window_hours: i64,
        cost_escalation_limit_rupees: i64,
        conflict_budget_ceiling_rupees: i64,
    ) -> Self {
        Self {
            coordination_repo,
            human_channel,
            conflict_window_hours,
            cost_escalation_limit: Money(cost_escalation_limit_rupees),
            budget_ceiling: Money(conflict_budget_ceiling_rupees),
            location_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Dispatch: static request-type → agent map (SPEC_FULL §4.2
    /// "Dispatch"). Job submission uses this to pick which pipeline to
    /// run before the job is even created.
    #[must_use]
    pub fn dispatch(request_type: &RequestType) -> AgentType {
        agent_mapping::resolve(request_type)
    }

    async fn lock_for(&self, location: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.location_locks.read().await.get(location) {
            return Arc::clone(lock);
        }
        let mut guard = self.location_locks.write().await;
        Arc::clone(guard.entry(location.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    /// Phase 6 entry point: runs the conflict check and, if it escalates,
    /// synchronously resolves it through the human channel (SPEC_FULL
    /// §4.2 "Human intervention channel").
    pub async fn checkpoint(&self, req: CheckpointRequest) -> Result<CheckpointOutcome, CoordinatorError> {
        match self.check_plan_conflicts(req.clone()).await? {
            Verdict::Proceed { decision_id } => Ok(CheckpointOutcome::Proceed { decision_id }),
            Verdict::Retry { conflicts, recommendations } => {
                // SPEC_FULL §4.2 "waits-for relation encoded in plan
                // metadata": a location/resource conflict names the
                // decision this retry is blocked on, so the next plan's
                // checkpoint request can declare the dependency instead of
                // leaving `waits_for` permanently empty.
                let blocking_decisions = conflicts
                    .iter()
                    .filter_map(|c| match c {
                        Conflict::Location { with_decision, .. } | Conflict::Resource { with_decision, .. } => {
                            Some(*with_decision)
                        }
                        Conflict::Budget { .. } | Conflict::Circular { .. } => None,
                    })
                    .collect();
                Ok(CheckpointOutcome::Retry { recommendations, blocking_decisions })
            }
            Verdict::Escalate { conflicts, requires_human } => {
                if !requires_human {
                    return Ok(CheckpointOutcome::Escalate);
                }
                self.resolve_escalation(req, conflicts).await
            }
        }
    }

    async fn resolve_escalation(
        &self,
        req: CheckpointRequest,
        conflicts: Vec<Conflict>,
    ) -> Result<CheckpointOutcome, CoordinatorError> {
        let urgency = if req.is_emergency { Urgency::Emergency } else { Urgency::Elevated };
        let approval_request = HumanApprovalRequest {
            id: Uuid::new_v4(),
            urgency,
            conflicts,
            options: vec![
                ApprovalOption::Approve,
                ApprovalOption::Defer,
                ApprovalOption::Reject,
                ApprovalOption::Modify,
            ],
        };
        let decision = self.human_channel.request_approval(approval_request).await;

        match decision.option {
            ApprovalOption::Approve => {
                let record = CoordinationDecision {
                    id: Uuid::new_v4(),
                    agent_type: req.agent_type,
                    location: req.location,
                    resources_needed: req.resources_needed,
                    estimated_cost: req.estimated_cost,
                    status: CoordinationStatus::Active,
                    created_at: Utc::now(),
                    plan_summary: req.plan_summary,
                    waits_for: req.waits_for,
                };
                let id = record.id;
                self.coordination_repo.insert(record).await?;
                Ok(CheckpointOutcome::Proceed { decision_id: id })
            }
            ApprovalOption::Reject => {
                Ok(CheckpointOutcome::Rejected { reason: decision.notes })
            }
            ApprovalOption::Defer | ApprovalOption::Modify => Ok(CheckpointOutcome::Escalate),
        }
    }

    /// The pure conflict-check-and-maybe-insert operation (SPEC_FULL
    /// §4.2 "CheckPlanConflicts"), serialized per location.
    pub async fn check_plan_conflicts(&self, req: CheckpointRequest) -> Result<Verdict, CoordinatorError> {
        let lock = self.lock_for(&req.location).await;
        let _guard = lock.lock().await;

        let since = Utc::now() - ChronoDuration::hours(self.conflict_window_hours);
        let same_location = self.coordination_repo.active_for_location(&req.location, since).await?;
        let all_active = self.coordination_repo.active_since(since).await?;

        let mut found = conflicts::location_and_resource_conflicts(&same_location, &req);
        if let Some(c) = conflicts::budget_conflict(&all_active, req.estimated_cost, self.budget_ceiling) {
            found.push(c);
        }
        if let Some(c) = conflicts::circular_conflict(&same_location) {
            found.push(c);
        }

        if found.is_empty() {
            let record = CoordinationDecision {
                id: Uuid::new_v4(),
                agent_type: req.agent_type,
                location: req.location,
                resources_needed: req.resources_needed,
                estimated_cost: req.estimated_cost,
                status: CoordinationStatus::Active,
                created_at: Utc::now(),
                plan_summary: req.plan_summary,
                waits_for: req.waits_for,
            };
            let id = record.id;
            self.coordination_repo.insert(record).await?;
            return Ok(Verdict::Proceed { decision_id: id });
        }

        let over_cost_limit = req.estimated_cost.0 > self.cost_escalation_limit.0;
        let has_circular = found.iter().any(|c| matches!(c, Conflict::Circular { .. }));

        // SPEC_FULL §4.2: escalate only on cost > COST_ESCALATION_LIMIT, a
        // flagged low-confidence scenario, or a circular dependency. A pure
        // budget-ceiling conflict retries with recommendations instead (the
        // agent can request emergency fund approval through a smaller plan).
        if req.is_emergency || over_cost_limit || has_circular {
            Ok(Verdict::Escalate { conflicts: found, requires_human: true })
        } else {
            let recommendations = found.iter().map(Conflict::describe).collect();
            Ok(Verdict::Retry { conflicts: found, recommendations })
        }
    }

    /// Phase 11/13: transitions the matching `CoordinationDecision.status`
    /// once the pipeline reaches a terminal decision (SPEC_FULL §4.2
    /// "RecordOutcome"). A no-op when no decision was ever inserted
    /// (degraded checkpoint, or a plain retry/escalate with no approval).
    pub async fn record_outcome(
        &self,
        decision_id: Option<Uuid>,
        final_decision: Decision,
    ) -> Result<(), CoordinatorError> {
        let Some(id) = decision_id else { return Ok(()) };
        let status = match final_decision {
            Decision::Recommend => CoordinationStatus::Completed,
            Decision::Escalate | Decision::Reject => CoordinationStatus::Superseded,
        };
        self.coordination_repo.set_status(id, status).await
    }
}
