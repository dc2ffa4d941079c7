//! Engineering department tools (SPEC_FULL §4.4).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_inspector_availability", check_inspector_availability),
    ("check_structural_risk", check_structural_risk),
    ("check_capacity", check_capacity),
];

fn check_inspector_availability(
    context: &ContextSnapshot,
    _request: &Request,
    arguments: &BTreeMap<String, Value>,
) -> Value {
    let crew = arguments.get("crew").and_then(Value::as_str).unwrap_or("inspectors");
    let available = context.worker_availability.get(crew).copied().unwrap_or(0) > 0;
    json!({ "inspector_available": available })
}

fn check_structural_risk(
    context: &ContextSnapshot,
    _request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let risk = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("structural"));
    json!({ "structural_risk": risk })
}

fn check_capacity(context: &ContextSnapshot, request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let active_at_location =
        context.active_projects.iter().filter(|p| p.contains(&request.location)).count();
    json!({
        "capacity_ok": active_at_location < 5,
        "active_projects_at_location": active_at_location,
    })
}
