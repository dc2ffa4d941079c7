//! Water department tools (SPEC_FULL §4.4). Pure reads over the already
//! loaded `ContextSnapshot`; no network or database access happens here.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::domain::models::{ContextSnapshot, Request};

pub const TOOLS: &[(&str, super::ToolFn)] = &[
    ("check_manpower", check_manpower),
    ("check_shift_conflicts", check_shift_conflicts),
    ("check_water_quality", check_water_quality),
    ("check_maintenance_window", check_maintenance_window),
];

/// Honors a `"crew"` argument from the calling plan step when present, so a
/// replanned step naming an alternate crew key can change the verdict on
/// retry (SPEC_FULL §9 "retries constrain the existing plan"). Falls back to
/// "any crew available" when the step doesn't name one.
fn check_manpower(context: &ContextSnapshot, _request: &Request, arguments: &BTreeMap<String, Value>) -> Value {
    let available = match arguments.get("crew").and_then(Value::as_str) {
        Some(crew) => context.worker_availability.get(crew).copied().unwrap_or(0) > 0,
        None => context.worker_availability.values().any(|&n| n > 0),
    };
    json!({ "workers_available": available })
}

fn check_shift_conflicts(context: &ContextSnapshot, request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let conflict = context
        .schedules
        .get(&request.location)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    json!({ "shift_conflict": conflict })
}

fn check_water_quality(context: &ContextSnapshot, _request: &Request, _arguments: &BTreeMap<String, Value>) -> Value {
    let critical = context.recent_incidents.iter().any(|i| i.to_lowercase().contains("water quality"));
    json!({ "water_quality_critical": critical })
}

fn check_maintenance_window(
    context: &ContextSnapshot,
    request: &Request,
    _arguments: &BTreeMap<String, Value>,
) -> Value {
    let blackout = context
        .active_projects
        .iter()
        .any(|p| p.to_lowercase().contains("blackout") && p.contains(&request.location));
    json!({ "maintenance_window_ok": !blackout })
}
