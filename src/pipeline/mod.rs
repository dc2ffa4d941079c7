//! The Agent Pipeline (SPEC_FULL §4.1): the 14-phase deterministic state
//! machine shared by every department, differing only in which
//! `ToolRegistry`/Rules Engine functions it calls. Phases are plain
//! methods on `AgentPipeline` rather than a trait-object graph, matching
//! the teacher's `services/phase_orchestrator.rs` style of an explicit,
//! linear `run()` over named steps instead of free recursion.

pub mod fallback;
pub mod schemas;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::agent_mapping;
use crate::coordinator::{CheckpointOutcome, Coordinator};
use crate::domain::error::PipelineError;
use crate::domain::models::{
    AgentState, AgentType, AuditRecord, CheckpointRequest, CheckpointVerdict, CoordinationCheck, Decision,
    FeasibilityVerdict, Observations, OutputDetails, PipelineOutput, RecommendationPayload, Request, RiskLevel,
    ToolResult,
};
use crate::domain::ports::{AuditRepository, ContextStore};
use crate::llm::{CallSite, LlmAdapter};
use crate::rules;
use crate::tools::ToolRegistry;

use fallback::money_from_i64;

/// Default timeout for the Phase 6 Coordinator checkpoint rendezvous.
/// Not named explicitly among the spec's configuration keys (only
/// `CONFLICT_WINDOW` is) — fixed here as an implementer decision
/// alongside the other SPEC_FULL §9 resolutions.
const CHECKPOINT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a completed `run()` call produced. `Cancelled` is distinct from
/// every `Decision` because a cancelled job persists no recommendation
/// at all (SPEC_FULL §5 "Cancellation and timeouts").
#[derive(Debug)]
pub enum RunOutcome {
    Completed(PipelineOutput),
    Cancelled,
}

pub struct AgentPipeline {
    agent_type: AgentType,
    tool_registry: ToolRegistry,
    context_store: Arc<dyn ContextStore>,
    llm: Arc<LlmAdapter>,
    coordinator: Arc<Coordinator>,
    audit_repo: Arc<dyn AuditRepository>,
    llm_flags: crate::domain::models::LlmFlags,
    confidence_threshold: f64,
    max_retries: u32,
}

impl AgentPipeline {
    #[must_use]
    pub fn new(
        agent_type: AgentType,
        context_store: Arc<dyn ContextStore>,
        llm: Arc<LlmAdapter>,
        coordinator: Arc<Coordinator>,
        audit_repo: Arc<dyn AuditRepository>,
        llm_flags: crate::domain::models::LlmFlags,
        confidence_threshold: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            agent_type,
            tool_registry: ToolRegistry::for_agent(agent_type),
            context_store,
            llm,
            coordinator,
            audit_repo,
            llm_flags,
            confidence_threshold,
            max_retries,
        }
    }

    #[instrument(skip(self, request, cancellation), fields(agent = %self.agent_type, request_id = %request_id))]
    pub async fn run(
        &self,
        request_id: Uuid,
        request: Request,
        cancellation: &crate::domain::models::CancellationFlag,
    ) -> Result<RunOutcome, PipelineError> {
        let mut state = AgentState::new(request_id, self.agent_type, request);

        // Phase 1: input validation.
        self.validate_input(&state)?;

        if cancellation.is_requested() {
            return Ok(RunOutcome::Cancelled);
        }

        // Phase 2: context loader.
        self.load_context(&mut state).await;

        if cancellation.is_requested() {
            return Ok(RunOutcome::Cancelled);
        }

        // Phase 3: intent + risk analyzer.
        self.classify_intent_and_risk(&mut state).await;

        let mut terminal: Option<Decision> = None;
        let mut human_rejection_reason: Option<String> = None;

        if state.risk_level == Some(RiskLevel::Critical) {
            terminal = Some(Decision::Escalate);
        } else {
            match self.run_planning_and_checkpoint_loop(&mut state, cancellation).await? {
                LoopOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
                LoopOutcome::Proceeded => {}
                LoopOutcome::Escalated => terminal = Some(Decision::Escalate),
                LoopOutcome::Rejected(reason) => {
                    terminal = Some(Decision::Reject);
                    human_rejection_reason = Some(reason);
                }
            }

            if terminal.is_none() {
                if cancellation.is_requested() {
                    return Ok(RunOutcome::Cancelled);
                }
                // Phase 7: tool executor.
                self.execute_tools(&mut state).await;

                // Phase 8: observer.
                self.observe(&mut state).await;

                // Phase 9: feasibility evaluator, with its own replan loop.
                match self.run_feasibility_loop(&mut state, cancellation).await? {
                    LoopOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
                    LoopOutcome::Proceeded => {}
                    LoopOutcome::Escalated => terminal = Some(Decision::Escalate),
                    LoopOutcome::Rejected(reason) => {
                        terminal = Some(Decision::Reject);
                        human_rejection_reason = Some(reason);
                    }
                }

                if terminal.is_none() {
                    // Phase 10: policy validator.
                    self.validate_policy(&mut state).await;
                }
            }
        }

        if cancellation.is_requested() {
            return Ok(RunOutcome::Cancelled);
        }

        // Phase 11: memory logger. Always runs exactly once per completed job.
        let rationale = human_rejection_reason
            .clone()
            .unwrap_or_else(|| self.rationale_for(&state, terminal));
        self.log_to_audit(&mut state, rationale).await;

        // Phase 12: confidence estimator (skipped when a terminal decision
        // was already forced by a short-circuit or human rejection).
        if terminal.is_none() {
            self.estimate_confidence(&mut state).await;
            // Phase 13: decision router.
            terminal = Some(self.route_decision(&state));
        }

        let decision = terminal.unwrap_or(Decision::Escalate);
        state.decision = Some(decision);

        self.coordinator.record_outcome(state.coordination_decision_id, decision).await.ok();

        // Phase 14: output generator.
        let output = self.build_output(&state, decision, human_rejection_reason);
        state.output = Some(output.clone());

        info!(decision = ?decision, confidence = ?state.confidence, "pipeline reached terminal decision");
        Ok(RunOutcome::Completed(output))
    }

    // ---- Phase 1 ----

    fn validate_input(&self, state: &AgentState) -> Result<(), PipelineError> {
        if !state.request.basic_fields_present() {
            return Err(PipelineError::InvalidInput(
                "location and originator must both be present".to_string(),
            ));
        }
        let resolved = agent_mapping::resolve(&state.request.request_type);
        if resolved != self.agent_type {
            return Err(PipelineError::InvalidInput(format!(
                "request_type '{}' is owned by {resolved}, not {}",
                state.request.request_type, self.agent_type
            )));
        }
        Ok(())
    }

    // ---- Phase 2 ----

    async fn load_context(&self, state: &mut AgentState) {
        match self.context_store.load_snapshot(&state.request.location).await {
            Ok(snapshot) => state.context = Some(snapshot),
            Err(e) => {
                warn!(error = %e, "context store read failed, continuing degraded");
                let mut snapshot = crate::domain::models::ContextSnapshot::default();
                snapshot.context_degraded = true;
                state.context = Some(snapshot);
            }
        }
    }

    // ---- Phase 3 ----

    async fn classify_intent_and_risk(&self, state: &mut AgentState) {
        let prompt = format!(
            "Classify the intent and risk level for a {} request at {}.",
            state.request.request_type, state.request.location
        );
        let response: Option<schemas::IntentResponse> =
            self.llm.complete_json(CallSite::Intent, self.llm_flags.intent, &prompt).await;

        match response {
            Some(r) => {
                state.intent = Some(r.intent);
                state.risk_level = Some(r.risk_level);
            }
            None => {
                state.intent = Some(fallback::intent_for(&state.request));
                state.risk_level = Some(fallback::risk_for(&state.request));
            }
        }
    }

    // ---- Phase 4 ----

    async fn set_goal(&self, state: &mut AgentState) {
        let intent = state.intent.clone().unwrap_or_default();
        let prompt = format!("State a single-sentence goal for intent '{intent}' on request {}.", state.request.request_type);
        let response: Option<schemas::GoalResponse> =
            self.llm.complete_json(CallSite::Goal, self.llm_flags.goal, &prompt).await;

        state.goal = Some(match response {
            Some(r) => r.goal,
            None => fallback::goal_for(&state.request, &intent),
        });
    }

    // ---- Phase 5 ----

    async fn plan(&self, state: &mut AgentState, extra_constraints: Vec<String>) {
        if let Some(plan) = state.plan.as_mut() {
            // SPEC_FULL §9: retries constrain the existing plan rather than
            // discarding it.
            plan.constraints.extend(extra_constraints);
            return;
        }

        let prompt = format!(
            "Produce a plan (tool_name/arguments steps, constraints, expected_duration_hours, estimated_cost) for goal '{}'.",
            state.goal.clone().unwrap_or_default()
        );
        let response: Option<schemas::PlanResponse> =
            self.llm.complete_json(CallSite::Planner, self.llm_flags.planner, &prompt).await;

        let mut plan = match response {
            Some(r) => crate::domain::models::Plan {
                steps: r
                    .steps
                    .into_iter()
                    .map(|s| crate::domain::models::PlanStep { tool_name: s.tool_name, arguments: s.arguments })
                    .collect(),
                constraints: r.constraints,
                expected_duration_hours: r.expected_duration_hours,
                estimated_cost: money_from_i64(r.estimated_cost),
            },
            None => fallback::template_plan(&state.request, &self.tool_registry),
        };

        plan.constraints.extend(extra_constraints);
        state.plan = Some(plan);
    }

    // ---- Phase 6 + replan loop (checkpoint side) ----

    async fn run_planning_and_checkpoint_loop(
        &self,
        state: &mut AgentState,
        cancellation: &crate::domain::models::CancellationFlag,
    ) -> Result<LoopOutcome, PipelineError> {
        // Decision ids this plan has learned it is blocked on across
        // retries, reported back to the Coordinator on the next checkpoint
        // so circular-dependency detection has real `waits_for` data to
        // walk (SPEC_FULL §4.2 "waits-for relation encoded in plan
        // metadata").
        let mut waits_for: BTreeSet<Uuid> = BTreeSet::new();

        loop {
            if cancellation.is_requested() {
                return Ok(LoopOutcome::Cancelled);
            }

            self.set_goal(state).await;
            self.plan(state, Vec::new()).await;

            let checkpoint_req = self.build_checkpoint_request(state, &waits_for);

            let outcome = tokio::time::timeout(CHECKPOINT_TIMEOUT, self.coordinator.checkpoint(checkpoint_req)).await;

            match outcome {
                Err(_elapsed) => {
                    warn!("coordinator checkpoint timed out, proceeding in degraded mode");
                    state.coordination_check =
                        Some(CoordinationCheck { verdict: CheckpointVerdict::Proceed, degraded: true });
                    return Ok(LoopOutcome::Proceeded);
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "coordinator unreachable, proceeding in degraded mode");
                    state.coordination_check =
                        Some(CoordinationCheck { verdict: CheckpointVerdict::Proceed, degraded: true });
                    return Ok(LoopOutcome::Proceeded);
                }
                Ok(Ok(CheckpointOutcome::Proceed { decision_id })) => {
                    state.coordination_check =
                        Some(CoordinationCheck { verdict: CheckpointVerdict::Proceed, degraded: false });
                    state.coordination_decision_id = Some(decision_id);
                    return Ok(LoopOutcome::Proceeded);
                }
                Ok(Ok(CheckpointOutcome::Retry { recommendations, blocking_decisions })) => {
                    state.coordination_check = Some(CoordinationCheck {
                        verdict: CheckpointVerdict::Retry { recommendations: recommendations.clone() },
                        degraded: false,
                    });
                    waits_for.extend(blocking_decisions);
                    state.retry_count += 1;
                    if state.retry_count > self.max_retries {
                        return Ok(LoopOutcome::Escalated);
                    }
                    self.plan(state, recommendations).await;
                    continue;
                }
                Ok(Ok(CheckpointOutcome::Escalate)) => {
                    state.coordination_check = Some(CoordinationCheck {
                        verdict: CheckpointVerdict::Escalate { requires_human: true, conflicts: Vec::new() },
                        degraded: false,
                    });
                    return Ok(LoopOutcome::Escalated);
                }
                Ok(Ok(CheckpointOutcome::Rejected { reason })) => {
                    return Ok(LoopOutcome::Rejected(reason));
                }
            }
        }
    }

    fn build_checkpoint_request(&self, state: &AgentState, waits_for: &BTreeSet<Uuid>) -> CheckpointRequest {
        let plan = state.plan.clone().unwrap_or_default();
        let is_emergency = matches!(state.risk_level, Some(RiskLevel::Critical) | Some(RiskLevel::High))
            || state.intent.as_deref().is_some_and(|i| i.contains("emergency"));
        CheckpointRequest {
            agent_type: self.agent_type,
            location: state.request.location.clone(),
            resources_needed: state.request.resources_needed.clone(),
            estimated_cost: plan.estimated_cost,
            plan_summary: state.goal.clone().unwrap_or_default(),
            waits_for: waits_for.clone(),
            is_emergency,
        }
    }

    // ---- Phase 7 ----

    async fn execute_tools(&self, state: &mut AgentState) {
        let Some(plan) = state.plan.clone() else { return };
        let context = state.context.clone().unwrap_or_default();

        let mut results = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let output = self
                .tool_registry
                .call(&step.tool_name, &context, &state.request, &step.arguments)
                .map_err(|e| e.to_string());
            results.push(ToolResult { tool_name: step.tool_name.clone(), output });
        }
        state.tool_results = results;
    }

    // ---- Phase 8 ----

    async fn observe(&self, state: &mut AgentState) {
        let context_degraded = state.context_degraded();
        let deterministic = fallback::extract_observations(&state.tool_results, context_degraded);

        let prompt = format!("Normalize these tool results into typed observations: {:?}", state.tool_results);
        let response: Option<schemas::ObserverResponse> =
            self.llm.complete_json(CallSite::Observer, self.llm_flags.observer, &prompt).await;

        state.observations = Some(match response {
            Some(r) => {
                let mut merged = deterministic;
                for (k, v) in r.fields {
                    merged.fields.insert(k, v);
                }
                merged
            }
            None => deterministic,
        });
    }

    // ---- Phase 9 + replan loop (feasibility side) ----

    async fn run_feasibility_loop(
        &self,
        state: &mut AgentState,
        cancellation: &crate::domain::models::CancellationFlag,
    ) -> Result<LoopOutcome, PipelineError> {
        loop {
            if cancellation.is_requested() {
                return Ok(LoopOutcome::Cancelled);
            }

            let observations = state.observations.clone().unwrap_or_default();
            let verdict = rules::feasibility(self.agent_type, &observations, &state.request);

            match verdict {
                FeasibilityVerdict::Feasible => {
                    state.feasible = Some(true);
                    state.feasibility_reason = None;
                    return Ok(LoopOutcome::Proceeded);
                }
                FeasibilityVerdict::IrrecoverableFailure { reason } => {
                    state.feasible = Some(false);
                    state.feasibility_reason = Some(reason);
                    return Ok(LoopOutcome::Proceeded);
                }
                FeasibilityVerdict::RepairableFailure { reason } => {
                    state.retry_count += 1;
                    if state.retry_count > self.max_retries {
                        state.feasible = Some(false);
                        state.feasibility_reason = Some(reason);
                        return Ok(LoopOutcome::Escalated);
                    }
                    self.plan(state, vec![reason]).await;

                    let context = state.context.clone().unwrap_or_default();
                    if let Some(plan) = state.plan.as_mut() {
                        fallback::repair_crew_argument(plan, &context);
                    }

                    self.execute_tools(state).await;
                    self.observe(state).await;
                    continue;
                }
            }
        }
    }

    // ---- Phase 10 ----

    async fn validate_policy(&self, state: &mut AgentState) {
        let observations = state.observations.clone().unwrap_or_default();
        let is_emergency = matches!(state.risk_level, Some(RiskLevel::Critical) | Some(RiskLevel::High));
        let verdict = rules::policy(self.agent_type, &observations, &state.request, is_emergency);

        let prompt = format!("Provide nuanced policy violation notes for: {:?}", verdict.violations);
        let response: Option<schemas::PolicyResponse> =
            self.llm.complete_json(CallSite::Policy, self.llm_flags.policy, &prompt).await;

        let mut violations = verdict.violations;
        if let Some(r) = response {
            violations.extend(r.extra_violation_notes);
        }

        state.policy_ok = Some(verdict.ok);
        state.policy_violations = violations;
    }

    // ---- Phase 11 ----

    async fn log_to_audit(&self, state: &mut AgentState, rationale: String) {
        let record = AuditRecord::from_state(Uuid::new_v4(), state, rationale);
        let id = record.id;
        if let Err(e) = self.audit_repo.append(record).await {
            warn!(error = %e, "failed to append audit record");
        }
        state.audit_id = Some(id);
    }

    fn rationale_for(&self, state: &AgentState, forced: Option<Decision>) -> String {
        if forced == Some(Decision::Escalate) && state.risk_level == Some(RiskLevel::Critical) {
            return "critical risk level short-circuited directly to escalation".to_string();
        }
        format!(
            "intent={} feasible={:?} policy_ok={:?} coordination_degraded={}",
            state.intent.as_deref().unwrap_or("unknown"),
            state.feasible,
            state.policy_ok,
            state.coordination_degraded()
        )
    }

    // ---- Phase 12 ----

    async fn estimate_confidence(&self, state: &mut AgentState) {
        let risk = state.risk_level.unwrap_or(RiskLevel::Medium);
        let observations = state.observations.clone().unwrap_or_else(Observations::default);
        let deterministic = rules::confidence(rules::ConfidenceInputs {
            feasible: state.feasible.unwrap_or(false),
            policy_ok: state.policy_ok.unwrap_or(false),
            risk_low: risk == RiskLevel::Low,
            risk_medium: risk == RiskLevel::Medium,
            risk_high: risk == RiskLevel::High,
            risk_critical: risk == RiskLevel::Critical,
            data_complete: !observations.incomplete && !state.context_degraded(),
            retry_count: state.retry_count,
            violation_count: u32::try_from(state.policy_violations.len()).unwrap_or(u32::MAX),
        });

        let prompt = "Provide a confidence score in [0,1] for this decision.".to_string();
        let response: Option<schemas::ConfidenceResponse> =
            self.llm.complete_json(CallSite::Confidence, self.llm_flags.confidence, &prompt).await;

        state.confidence = Some(match response {
            Some(r) => 0.5 * deterministic + 0.5 * r.score.clamp(0.0, 1.0),
            None => deterministic,
        });
    }

    // ---- Phase 13 ----

    fn route_decision(&self, state: &AgentState) -> Decision {
        let high_or_critical_risk =
            matches!(state.risk_level, Some(RiskLevel::High) | Some(RiskLevel::Critical));
        let below_threshold = state.confidence.unwrap_or(0.0) < self.confidence_threshold;

        if !state.policy_ok.unwrap_or(false)
            || below_threshold
            || high_or_critical_risk
            || !state.feasible.unwrap_or(false)
            || state.requires_human_from_checkpoint()
        {
            Decision::Escalate
        } else {
            Decision::Recommend
        }
    }

    // ---- Phase 14 ----

    fn build_output(&self, state: &AgentState, decision: Decision, rejection_reason: Option<String>) -> PipelineOutput {
        let plan = state.plan.clone().unwrap_or_default();
        let confidence = state.confidence.unwrap_or(0.0);

        let reason = rejection_reason.unwrap_or_else(|| match decision {
            Decision::Recommend => "all checks passed".to_string(),
            Decision::Escalate => self.escalation_reason(state),
            Decision::Reject => "human intervention rejected the plan".to_string(),
        });

        let recommendation = (decision == Decision::Recommend).then(|| RecommendationPayload {
            action: "proceed",
            plan: plan.clone(),
            confidence,
        });

        PipelineOutput {
            decision,
            reason,
            requires_human_review: decision != Decision::Recommend,
            recommendation,
            details: OutputDetails {
                feasible: state.feasible.unwrap_or(false),
                policy_compliant: state.policy_ok.unwrap_or(false),
                confidence,
                risk_level: state.risk_level.unwrap_or(RiskLevel::Medium),
                plan,
                policy_violations: state.policy_violations.clone(),
                observations: state.observations.clone().map(|o| o.fields).unwrap_or_default(),
                feasibility_reason: state.feasibility_reason.clone().unwrap_or_default(),
                context_degraded: state.context_degraded(),
                coordination_degraded: state.coordination_degraded(),
                retry_count: state.retry_count,
            },
        }
    }

    fn escalation_reason(&self, state: &AgentState) -> String {
        if state.risk_level == Some(RiskLevel::Critical) {
            return "risk level graded critical".to_string();
        }
        if state.requires_human_from_checkpoint() {
            return "coordination checkpoint required human review".to_string();
        }
        if !state.feasible.unwrap_or(false) {
            return state.feasibility_reason.clone().unwrap_or_else(|| "infeasible".to_string());
        }
        if !state.policy_ok.unwrap_or(false) {
            return format!("policy violations: {}", state.policy_violations.join("; "));
        }
        format!("confidence {:.2} below threshold {:.2}", state.confidence.unwrap_or(0.0), self.confidence_threshold)
    }
}

enum LoopOutcome {
    Proceeded,
    Escalated,
    Rejected(String),
    Cancelled,
}
