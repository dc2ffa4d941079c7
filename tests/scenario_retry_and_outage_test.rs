//! Universal invariants (spec §8): a feasibility failure that never
//! clears keeps replanning up to `max_retries` and then escalates
//! instead of looping forever; a repairable failure with an alternate
//! crew actually available recovers within the retry budget instead of
//! escalating; and an LLM outage still yields a decision computed purely
//! from the deterministic confidence calculator.

mod helpers;

use std::collections::BTreeMap;
use std::sync::Arc;

use muniops::domain::models::{AgentType, ContextSnapshot, Decision};
use muniops::pipeline::RunOutcome;

use helpers::{request, FixedContextStore, Harness};

/// No crew registered anywhere: `check_manpower` reports
/// `workers_available: false` on every tool execution, so the Phase 9
/// feasibility loop never turns feasible no matter how many times it
/// replans. The (max_retries + 1)-th evaluation must terminate in
/// `escalate`, not recurse without bound.
#[tokio::test]
async fn unrecoverable_manpower_shortfall_escalates_after_max_retries() {
    let context_store = Arc::new(FixedContextStore::new().with_snapshot("Sector 4", ContextSnapshot::default()));
    let harness = Harness::build(context_store, 3_00_00_000).await;

    let req = request("maintenance_request", "Sector 4", BTreeMap::new());
    let outcome = harness.run(AgentType::Water, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert_eq!(output.decision, Decision::Escalate);
    assert!(!output.details.feasible);
    // max_retries is 3 in the harness: the loop increments retry_count on
    // every RepairableFailure and only escalates once it exceeds that
    // ceiling, so the terminal state reports max_retries + 1.
    assert_eq!(output.details.retry_count, 4);
}

/// The default crew ("collection_crews") is empty but an alternate crew
/// ("night_crew") has workers: the first feasibility evaluation reports a
/// repairable failure, the Phase 9 repair step retargets the plan's
/// crew-aware tool calls onto the alternate crew, and the retried tool
/// execution clears the feasibility check without ever escalating.
#[tokio::test]
async fn repairable_manpower_shortfall_recovers_on_retry() {
    let mut availability = BTreeMap::new();
    availability.insert("collection_crews".to_string(), 0);
    availability.insert("night_crew".to_string(), 2);
    let snapshot = ContextSnapshot { worker_availability: availability, ..Default::default() };
    let context_store = Arc::new(FixedContextStore::new().with_snapshot("Ward 9", snapshot));
    let harness = Harness::build(context_store, 3_00_00_000).await;

    let req = request("collection_schedule_request", "Ward 9", BTreeMap::new());
    let outcome = harness.run(AgentType::Sanitation, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert_eq!(output.decision, Decision::Recommend);
    assert!(output.details.feasible, "the alternate crew should have cleared the feasibility check");
    assert_eq!(output.details.retry_count, 1, "exactly one repair loop should have run");
}

/// Every LLM call site is disabled in the harness, so intent/risk,
/// planning and policy all run their deterministic fallbacks. The
/// resulting confidence must still land wherever
/// `rules::confidence` puts a feasible, policy-compliant, complete-data
/// routine request: comfortably above the 0.7 threshold the harness
/// configures.
#[tokio::test]
async fn llm_outage_still_produces_a_deterministic_decision() {
    let mut availability = BTreeMap::new();
    availability.insert("crew-a".to_string(), 2);
    let snapshot = ContextSnapshot { worker_availability: availability, ..Default::default() };
    let context_store = Arc::new(FixedContextStore::new().with_snapshot("Downtown", snapshot));
    let harness = Harness::build(context_store, 3_00_00_000).await;

    let req = request("schedule_shift_request", "Downtown", BTreeMap::new());
    let outcome = harness.run(AgentType::Water, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert_eq!(output.decision, Decision::Recommend);
    assert!(output.details.confidence > 0.0, "confidence must come from the deterministic calculator, not an LLM");
    assert_eq!(output.details.retry_count, 0, "a clean run needs no replanning");
}
