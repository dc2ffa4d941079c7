//! `AgentState`: the mutable per-request record threaded through the
//! 14-phase pipeline (SPEC_FULL §3, §4.1).
//!
//! Single-writer discipline: each phase reads only fields written by
//! earlier phases and writes only its own declared outputs. The type
//! itself does not enforce this (phases are plain methods taking
//! `&mut AgentState`); it is enforced by code review discipline alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::request::{AgentType, Money, Request};

/// Safety grading assigned at Phase 3. `Critical` short-circuits straight
/// to Output with `decision = escalate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Terminal decision produced by Phase 13 (SPEC_FULL §4.1, §GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Recommend,
    Escalate,
    Reject,
}

/// Context Store snapshot loaded at Phase 2. Left mostly empty (with
/// `context_degraded = true`) on any read error, per SPEC_FULL §4.1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub active_projects: Vec<String>,
    pub schedules: BTreeMap<String, Value>,
    pub worker_availability: BTreeMap<String, u32>,
    pub infrastructure_health: BTreeMap<String, Value>,
    pub budget_remaining: Option<Money>,
    pub recent_incidents: Vec<String>,
    pub context_degraded: bool,
}

/// One step of a plan: a named tool call plus its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub tool_name: String,
    pub arguments: BTreeMap<String, Value>,
}

/// The planner's output (Phase 5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub constraints: Vec<String>,
    pub expected_duration_hours: Option<f64>,
    pub estimated_cost: Money,
}

/// Coordinator's verdict on a checkpoint call (SPEC_FULL §4.2 "Verdict").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckpointVerdict {
    Proceed,
    Retry { recommendations: Vec<String> },
    Escalate { requires_human: bool, conflicts: Vec<String> },
}

/// Phase 6's record of the checkpoint exchange, stored on `AgentState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationCheck {
    pub verdict: CheckpointVerdict,
    /// Set when the Coordinator was unreachable and the pipeline proceeded
    /// in degraded mode (SPEC_FULL §4.1 Phase 6, §8 boundary behavior).
    pub degraded: bool,
}

/// Per-step execution result from Phase 7. A tool failure is recorded
/// here but never aborts the pipeline (SPEC_FULL §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    pub output: Result<Value, String>,
}

/// Normalized, typed observations produced at Phase 8 from raw
/// `tool_results` (SPEC_FULL §3 "observations").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observations {
    pub fields: BTreeMap<String, Value>,
    /// True when data completeness was compromised (a tool errored, or
    /// context was degraded) — feeds the confidence calculator's
    /// data-completeness term.
    pub incomplete: bool,
}

impl Observations {
    #[must_use]
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Result of the deterministic Feasibility Evaluator (Phase 9). A
/// repairable failure loops back to the Planner; an irrecoverable one
/// continues with `feasible = false` (SPEC_FULL §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeasibilityVerdict {
    Feasible,
    RepairableFailure { reason: String },
    IrrecoverableFailure { reason: String },
}

/// Result of the Policy Validator (Phase 10).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub ok: bool,
    pub violations: Vec<String>,
}

/// The externally observable response built at Phase 14 (SPEC_FULL §6
/// "Result payload").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub decision: Decision,
    pub reason: String,
    pub requires_human_review: bool,
    pub recommendation: Option<RecommendationPayload>,
    pub details: OutputDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub action: &'static str,
    pub plan: Plan,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDetails {
    pub feasible: bool,
    pub policy_compliant: bool,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub plan: Plan,
    pub policy_violations: Vec<String>,
    pub observations: BTreeMap<String, Value>,
    pub feasibility_reason: String,
    pub context_degraded: bool,
    pub coordination_degraded: bool,
    pub retry_count: u32,
}

/// The mutable per-request record threaded through the pipeline
/// (SPEC_FULL §3 "AgentState"). Created by the Job Manager, mutated only
/// by pipeline phases, frozen at the terminal phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub request_id: Uuid,
    pub agent_type: AgentType,
    pub request: Request,

    pub context: Option<ContextSnapshot>,

    pub intent: Option<String>,
    pub risk_level: Option<RiskLevel>,

    pub goal: Option<String>,

    pub plan: Option<Plan>,

    pub retry_count: u32,

    pub coordination_check: Option<CoordinationCheck>,
    pub coordination_decision_id: Option<Uuid>,

    pub tool_results: Vec<ToolResult>,

    pub observations: Option<Observations>,

    pub feasible: Option<bool>,
    pub feasibility_reason: Option<String>,

    pub policy_ok: Option<bool>,
    pub policy_violations: Vec<String>,

    pub confidence: Option<f64>,

    pub decision: Option<Decision>,

    pub output: Option<PipelineOutput>,

    pub audit_id: Option<Uuid>,
}

impl AgentState {
    #[must_use]
    pub fn new(request_id: Uuid, agent_type: AgentType, request: Request) -> Self {
        Self {
            request_id,
            agent_type,
            request,
            context: None,
            intent: None,
            risk_level: None,
            goal: None,
            plan: None,
            retry_count: 0,
            coordination_check: None,
            coordination_decision_id: None,
            tool_results: Vec::new(),
            observations: None,
            feasible: None,
            feasibility_reason: None,
            policy_ok: None,
            policy_violations: Vec::new(),
            confidence: None,
            decision: None,
            output: None,
            audit_id: None,
        }
    }

    #[must_use]
    pub fn context_degraded(&self) -> bool {
        self.context.as_ref().is_some_and(|c| c.context_degraded)
    }

    #[must_use]
    pub fn coordination_degraded(&self) -> bool {
        self.coordination_check.as_ref().is_some_and(|c| c.degraded)
    }

    #[must_use]
    pub fn requires_human_from_checkpoint(&self) -> bool {
        matches!(
            self.coordination_check.as_ref().map(|c| &c.verdict),
            Some(CheckpointVerdict::Escalate { requires_human: true, .. })
        )
    }
}
