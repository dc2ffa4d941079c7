//! `AuditRecord`: the append-only audit row written at Phase 11
//! (SPEC_FULL §3, persisted as the `agent_decisions` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::{AgentType, Money};
use super::state::{AgentState, Decision};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub request_id: Uuid,
    pub agent_type: AgentType,
    /// The entire `AgentState` snapshot at the point Phase 11 ran
    /// (confidence/decision are not yet set then — they are Phases
    /// 12/13 — so this is a JSON snapshot of the fields known at that
    /// point, serialized as-is).
    pub state_snapshot: serde_json::Value,
    pub rationale: String,
    pub policies_referenced: Vec<String>,
    pub affected_citizens: Option<u64>,
    pub cost_impact: Option<Money>,
    pub timestamp: DateTime<Utc>,
    /// Filled in once the pipeline reaches Phase 13; `None` between
    /// Phase 11 (when the row is written) and Phase 13 is never
    /// observable outside the pipeline since writes are batched at the
    /// repository boundary — kept `Option` only because the domain model
    /// predates the decision being known within one phase's scope.
    pub decision: Option<Decision>,
}

impl AuditRecord {
    /// Build the audit row from a state snapshot taken at Phase 11. The
    /// `decision` field is attached once Phase 13 completes, via
    /// `with_decision`.
    #[must_use]
    pub fn from_state(id: Uuid, state: &AgentState, rationale: String) -> Self {
        Self {
            id,
            request_id: state.request_id,
            agent_type: state.agent_type,
            state_snapshot: serde_json::to_value(state).unwrap_or(serde_json::Value::Null),
            rationale,
            policies_referenced: state.policy_violations.clone(),
            affected_citizens: None,
            cost_impact: state.plan.as_ref().map(|p| p.estimated_cost),
            timestamp: Utc::now(),
            decision: state.decision,
        }
    }

    #[must_use]
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }
}
