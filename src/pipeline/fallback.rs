//! Deterministic fallbacks (SPEC_FULL §4.1, §4.5): every LLM-backed
//! phase has one of these, engaged whenever the adapter returns "no
//! answer" or the call is disabled.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::models::{
    ContextSnapshot, Money, Observations, Plan, PlanStep, Request, RiskLevel, ToolResult,
};
use crate::tools::{ToolRegistry, CREW_AWARE_TOOLS};

/// Phase 3 intent fallback: derived straight from the normalized request
/// type, so it is always available and stable across runs.
#[must_use]
pub fn intent_for(request: &Request) -> String {
    format!("handle_{}", request.request_type.as_str())
}

/// Phase 3 risk fallback. A `priority` field of `"critical"`/`"emergency"`
/// or a request type naming an emergency always grades `critical`; a
/// handful of type-name substrings grade `high`; everything else starts
/// at `low` (scenario 1's routine shift must grade `low` to clear the
/// confidence threshold with headroom).
#[must_use]
pub fn risk_for(request: &Request) -> RiskLevel {
    let t = request.request_type.as_str();
    let priority_critical = request
        .field_str("priority")
        .is_some_and(|p| p.eq_ignore_ascii_case("critical") || p.eq_ignore_ascii_case("emergency"));

    if priority_critical || t.contains("emergency") {
        RiskLevel::Critical
    } else if t.contains("incident") || t.contains("outbreak") || t.contains("failure") || t.contains("dumping") {
        RiskLevel::High
    } else if t.contains("audit") || t.contains("inspection") {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Phase 4 goal fallback.
#[must_use]
pub fn goal_for(request: &Request, intent: &str) -> String {
    format!("Resolve the {intent} request for {} at {} on behalf of {}", request.request_type, request.location, request.originator)
}

/// Phase 5 planner fallback: a template plan calling every tool this
/// department owns, so the Observer always has something to normalize
/// even with the LLM disabled (SPEC_FULL §5 scenario 5 "LLM outage").
#[must_use]
pub fn template_plan(request: &Request, registry: &ToolRegistry) -> Plan {
    let steps = registry
        .names()
        .into_iter()
        .map(|name| PlanStep { tool_name: name.to_string(), arguments: BTreeMap::new() })
        .collect();

    Plan {
        steps,
        constraints: Vec::new(),
        expected_duration_hours: Some(4.0),
        estimated_cost: request.estimated_cost.unwrap_or_default(),
    }
}

/// Phase 8 observer fallback: flattens every successful tool output
/// object into one observation record; any tool error or a degraded
/// context both mark `incomplete`.
#[must_use]
pub fn extract_observations(tool_results: &[ToolResult], context_degraded: bool) -> Observations {
    let mut fields = BTreeMap::new();
    let mut incomplete = context_degraded;

    for result in tool_results {
        match &result.output {
            Ok(Value::Object(map)) => {
                for (k, v) in map {
                    fields.insert(k.clone(), v.clone());
                }
            }
            Ok(other) => {
                fields.insert(result.tool_name.clone(), other.clone());
            }
            Err(_) => incomplete = true,
        }
    }

    Observations { fields, incomplete }
}

#[must_use]
pub fn money_from_i64(value: i64) -> Money {
    Money(value.max(0))
}

/// Phase 9 repair step: on a repairable manpower shortfall, steer the
/// next retry's crew-aware tool calls onto any `worker_availability` key
/// that still has workers (SPEC_FULL §8 scenario 4 "repairable infeasibility
/// resolved by retry"). Returns `false` (plan left untouched) when no
/// alternate crew has anyone available, so the loop can still converge on
/// `IrrecoverableFailure` instead of spinning through identical retries.
pub fn repair_crew_argument(plan: &mut Plan, context: &ContextSnapshot) -> bool {
    let Some(alternate) = context
        .worker_availability
        .iter()
        .find(|(_, &count)| count > 0)
        .map(|(name, _)| name.clone())
    else {
        return false;
    };

    let mut repaired = false;
    for step in &mut plan.steps {
        if CREW_AWARE_TOOLS.contains(&step.tool_name.as_str()) {
            step.arguments.insert("crew".to_string(), Value::String(alternate.clone()));
            repaired = true;
        }
    }
    repaired
}
