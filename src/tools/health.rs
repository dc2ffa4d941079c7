//! Health department tools (SPEC_FULL §4.4).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_inspector_availability", check_inspector_availability),
    ("check_outbreak_risk", check_outbreak_risk),
    ("check_permit_status", check_permit_status),
];

fn check_inspector_availability(
    context: &ContextSnapshot,
    _request: &Request,
    arguments: &BTreeMap<String, Value>,
) -> Value {
    let crew = arguments.get("crew").and_then(Value::as_str).unwrap_or("health_inspectors");
    let available = context.worker_availability.get(crew).copied().unwrap_or(0) > 0;
    json!({ "inspector_available": available })
}

fn check_outbreak_risk(context: &ContextSnapshot, _request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let risk = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("outbreak"));
    json!({ "outbreak_risk": risk })
}

fn check_permit_status(context: &ContextSnapshot, request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let compliant = context
        .infrastructure_health
        .get(&format!("{}_permit", request.location))
        .and_then(Value::as_str)
        .is_none_or(|s| s.eq_ignore_ascii_case("valid"));
    json!({ "permit_compliant": compliant })
}
