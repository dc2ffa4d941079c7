//! `CoordinationDecision` and the human-intervention channel's data model
//! (SPEC_FULL §3, §4.2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::request::{AgentType, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationStatus {
    Active,
    Completed,
    Superseded,
}

/// One active (or historical) plan, persisted per active plan
/// (SPEC_FULL §3 "CoordinationDecision"). Rows are shared by all agents
/// and mutated only via the Coordinator's transactional API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationDecision {
    pub id: Uuid,
    pub agent_type: AgentType,
    pub location: String,
    pub resources_needed: BTreeSet<String>,
    pub estimated_cost: Money,
    pub status: CoordinationStatus,
    pub created_at: DateTime<Utc>,
    pub plan_summary: String,
    /// Decision ids this plan declared itself dependent on at checkpoint
    /// time, carried over from `CheckpointRequest::waits_for` so the
    /// circular-dependency detector can walk the relation across multiple
    /// persisted rows, not just within one in-flight request
    /// (SPEC_FULL §4.2 "waits-for relation encoded in plan metadata").
    pub waits_for: BTreeSet<Uuid>,
}

/// The kinds of conflict the detector can find (SPEC_FULL §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Conflict {
    Location { with_decision: Uuid, with_agent: AgentType },
    Resource { with_decision: Uuid, shared: BTreeSet<String> },
    Budget { total_with_plan: Money, ceiling: Money },
    Circular { cycle: Vec<Uuid> },
}

impl Conflict {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Location { with_decision, with_agent } => {
                format!("location already committed by {with_agent} (decision {with_decision})")
            }
            Self::Resource { with_decision, shared } => {
                format!("resources {shared:?} already reserved by decision {with_decision}")
            }
            Self::Budget { total_with_plan, ceiling } => {
                format!("fiscal-scope total {total_with_plan} exceeds ceiling {ceiling}")
            }
            Self::Circular { cycle } => format!("circular wait-for dependency: {cycle:?}"),
        }
    }
}

/// The Coordinator's response to a checkpoint call (SPEC_FULL §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Proceed { decision_id: Uuid },
    Retry { conflicts: Vec<Conflict>, recommendations: Vec<String> },
    Escalate { conflicts: Vec<Conflict>, requires_human: bool },
}

/// The plan summary an agent sends to the Coordinator at Phase 6
/// (SPEC_FULL §4.2 `CheckPlanConflicts` arguments).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRequest {
    pub agent_type: AgentType,
    pub location: String,
    pub resources_needed: BTreeSet<String>,
    pub estimated_cost: Money,
    pub plan_summary: String,
    /// Plan metadata used for circular-dependency detection (SPEC_FULL
    /// §4.2 "waits-for relation encoded in plan metadata").
    pub waits_for: BTreeSet<Uuid>,
    pub is_emergency: bool,
}

/// Urgency used to decide ordering when multiple approvals are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Elevated,
    Emergency,
}

/// One of the four options a human can pick for an escalated checkpoint
/// (SPEC_FULL §4.2 "Human intervention channel").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOption {
    Approve,
    Defer,
    Reject,
    Modify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanApprovalRequest {
    pub id: Uuid,
    pub urgency: Urgency,
    pub conflicts: Vec<Conflict>,
    pub options: Vec<ApprovalOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanApprovalDecision {
    pub option: ApprovalOption,
    pub approver: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}
