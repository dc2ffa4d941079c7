//! Scenarios 3 and 6 (spec §8 "Concrete scenarios"): a budget deadlock
//! across concurrent submissions in one location, and a Context-Store
//! outage that degrades the pipeline without changing its decision
//! logic. Also covers the waits-for relation the circular-dependency
//! detector depends on.

mod helpers;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use muniops::coordinator::CheckpointOutcome;
use muniops::domain::models::{AgentType, CheckpointRequest, ContextSnapshot, Decision, Money};
use muniops::pipeline::RunOutcome;
use serde_json::json;

use helpers::{request, AlwaysDeferChannel, FixedContextStore, Harness};

/// Four `project_planning`/`capacity_query` submissions totalling ₹12
/// crore against a ₹3 crore ceiling: the first proceeds, and every
/// submission after it hits the budget ceiling and is escalated. The
/// approval queue here never rubber-stamps a conflict (`AlwaysDeferChannel`)
/// — with the production default (`AutoApproveChannel`) an escalated
/// budget conflict would still be admitted as a new active decision, which
/// would defeat the point of this scenario.
#[tokio::test]
async fn concurrent_submissions_over_budget_ceiling_deadlock() {
    let mut availability = BTreeMap::new();
    availability.insert("inspectors".to_string(), 2);
    let snapshot = ContextSnapshot { worker_availability: availability, ..Default::default() };
    let context_store = Arc::new(FixedContextStore::new().with_snapshot("Downtown", snapshot));
    let harness = Harness::build_with_channel(context_store, 3_00_00_000, Arc::new(AlwaysDeferChannel)).await;

    let mut decisions = Vec::new();
    for _ in 0..4 {
        let mut fields = BTreeMap::new();
        fields.insert("estimated_cost".to_string(), json!(3_00_00_000i64));
        let mut req = request("project_planning", "Downtown", fields);
        req.estimated_cost = Some(muniops::domain::models::Money::crore(3));

        let outcome = harness.run(AgentType::Engineering, req).await;
        let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
        decisions.push(output.decision);
    }

    assert_eq!(decisions[0], Decision::Recommend, "first submission should clear with no prior conflicts");
    assert!(
        decisions[1..].iter().all(|d| *d == Decision::Escalate),
        "submissions after the first should all escalate once the budget ceiling is exceeded, got {decisions:?}"
    );
}

/// Exercises the waits-for plumbing end to end against the real
/// Coordinator + `SQLite` repository: a second checkpoint that conflicts
/// with an already-active decision learns that decision's id back on
/// `CheckpointOutcome::Retry`, the same mechanism
/// `AgentPipeline::run_planning_and_checkpoint_loop` merges into the next
/// `CheckpointRequest::waits_for` — this is the data `circular_conflict`
/// walks, previously unreachable because `waits_for` was always sent
/// empty.
#[tokio::test]
async fn retry_conflict_surfaces_the_blocking_decision_id_for_waits_for() {
    let harness = Harness::build(Arc::new(FixedContextStore::new()), 3_00_00_000).await;

    let first = CheckpointRequest {
        agent_type: AgentType::Water,
        location: "Riverside".to_string(),
        resources_needed: BTreeSet::new(),
        estimated_cost: Money::lakh(1),
        plan_summary: "first plan".to_string(),
        waits_for: BTreeSet::new(),
        is_emergency: false,
    };
    let first_outcome = harness.coordinator.checkpoint(first).await.expect("checkpoint");
    let CheckpointOutcome::Proceed { decision_id: first_id } = first_outcome else {
        panic!("first checkpoint should proceed with no prior conflicts")
    };

    let second = CheckpointRequest {
        agent_type: AgentType::Engineering,
        location: "Riverside".to_string(),
        resources_needed: BTreeSet::new(),
        estimated_cost: Money::lakh(1),
        plan_summary: "second plan".to_string(),
        waits_for: BTreeSet::new(),
        is_emergency: false,
    };
    let second_outcome = harness.coordinator.checkpoint(second).await.expect("checkpoint");
    let CheckpointOutcome::Retry { blocking_decisions, .. } = second_outcome else {
        panic!("a different agent at the same active location should retry, not proceed or escalate")
    };
    assert_eq!(blocking_decisions, BTreeSet::from([first_id]));
}

#[tokio::test]
async fn context_store_outage_degrades_without_changing_decision_logic() {
    let unreachable = Arc::new(FixedContextStore::unreachable());
    let harness = Harness::build(unreachable, 3_00_00_000).await;

    let req = request("capacity_query", "Downtown", BTreeMap::new());
    let outcome = harness.run(AgentType::Engineering, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert!(output.details.context_degraded, "context_degraded should be annotated in the output");
    assert!(matches!(output.decision, Decision::Recommend | Decision::Escalate));
}
