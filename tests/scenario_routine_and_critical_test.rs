//! Scenarios 1 and 2 (spec §8 "Concrete scenarios"): a routine, feasible
//! request clears the confidence threshold and leaves one active
//! coordination row; a critical-risk request short-circuits straight to
//! `escalate` before any tool call.

mod helpers;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use muniops::domain::models::{AgentType, ContextSnapshot, Decision};
use muniops::domain::ports::CoordinationRepository;
use muniops::pipeline::RunOutcome;
use serde_json::json;

use helpers::{request, FixedContextStore, Harness};

#[tokio::test]
async fn routine_water_shift_recommends_with_headroom() {
    let mut availability = BTreeMap::new();
    availability.insert("crew-a".to_string(), 3);

    let snapshot = ContextSnapshot { worker_availability: availability, ..Default::default() };
    let context_store = Arc::new(FixedContextStore::new().with_snapshot("Downtown", snapshot));
    let harness = Harness::build(context_store, 3_00_00_000).await;

    let mut fields = BTreeMap::new();
    fields.insert("requested_shift_days".to_string(), json!(2));
    let req = request("schedule_shift_request", "Downtown", fields);

    let outcome = harness.run(AgentType::Water, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert_eq!(output.decision, Decision::Recommend);
    assert!(output.details.feasible);
    assert!(output.details.policy_compliant);
    assert!(output.details.confidence >= 0.8, "confidence was {}", output.details.confidence);

    let since = Utc::now() - Duration::hours(1);
    let rows = harness.coordination_repo.active_for_location("Downtown", since).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn critical_fire_emergency_escalates_without_tool_calls() {
    let context_store = Arc::new(FixedContextStore::new());
    let harness = Harness::build(context_store, 3_00_00_000).await;

    let mut fields = BTreeMap::new();
    fields.insert("priority".to_string(), json!("critical"));
    let req = request("fire_emergency", "Industrial Zone", fields);

    let outcome = harness.run(AgentType::Fire, req).await;

    let RunOutcome::Completed(output) = outcome else { panic!("expected a completed run") };
    assert_eq!(output.decision, Decision::Escalate);
    assert!(output.details.observations.is_empty(), "no tool observations should be recorded on short-circuit");
}
