//! Sanitation department tools (SPEC_FULL §4.4).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_crew_availability", check_crew_availability),
    ("check_bin_capacity", check_bin_capacity),
    ("check_dump_hazard", check_dump_hazard),
];

fn check_crew_availability(
    context: &ContextSnapshot,
    _request: &Request,
    arguments: &BTreeMap<String, Value>,
) -> Value {
    let crew = arguments.get("crew").and_then(Value::as_str).unwrap_or("collection_crews");
    let available = context.worker_availability.get(crew).copied().unwrap_or(0) > 0;
    json!({ "crew_available": available })
}

fn check_bin_capacity(context: &ContextSnapshot, request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let over_capacity = context
        .infrastructure_health
        .get(&format!("{}_bins", request.location))
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("full"));
    json!({ "bin_capacity_ok": !over_capacity })
}

fn check_dump_hazard(context: &ContextSnapshot, _request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let hazard = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("illegal dump"));
    json!({ "illegal_dump_hazard": hazard })
}
