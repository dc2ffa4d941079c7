//! Finance department tools (SPEC_FULL §4.4).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_budget_availability", check_budget_availability),
    ("check_audit_flag", check_audit_flag),
    ("check_expenditure_ceiling", check_expenditure_ceiling),
];

fn check_budget_availability(
    context: &ContextSnapshot,
    request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let available = match (context.budget_remaining, request.estimated_cost) {
        (Some(remaining), Some(cost)) => remaining.0 >= cost.0,
        (Some(remaining), None) => remaining.0 > 0,
        (None, _) => true,
    };
    json!({ "budget_available": available })
}

fn check_audit_flag(context: &ContextSnapshot, _request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let flagged = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("audit"));
    json!({ "audit_flag": flagged })
}

fn check_expenditure_ceiling(
    context: &ContextSnapshot,
    request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let over = match (context.budget_remaining, request.estimated_cost) {
        (Some(remaining), Some(cost)) => cost.0 > remaining.0 / 2,
        _ => false,
    };
    json!({ "over_ceiling": over })
}
