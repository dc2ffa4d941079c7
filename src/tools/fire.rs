//! Fire department tools (SPEC_FULL §4.4).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_apparatus_availability", check_apparatus_availability),
    ("check_life_safety_risk", check_life_safety_risk),
    ("check_inspection_status", check_inspection_status),
];

fn check_apparatus_availability(
    context: &ContextSnapshot,
    _request: &Request,
    arguments: &BTreeMap<String, Value>,
) -> Value {
    let crew = arguments.get("crew").and_then(Value::as_str).unwrap_or("crews");
    let available = context.worker_availability.get(crew).copied().unwrap_or(0) > 0;
    json!({ "apparatus_available": available })
}

fn check_life_safety_risk(
    context: &ContextSnapshot,
    _request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let risk = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("fire"));
    json!({ "life_safety_risk": risk })
}

fn check_inspection_status(
    context: &ContextSnapshot,
    request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let overdue = context
        .schedules
        .get(&format!("{}_inspection", request.location))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    json!({ "inspection_overdue": overdue })
}
