//! JSON shapes expected back from the LLM Oracle at each call site
//! (SPEC_FULL §4.5). Each one mirrors exactly what its phase needs and
//! nothing more — the adapter validates against these via `serde`, and a
//! parse failure is just another "no answer".

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::models::RiskLevel;

#[derive(Debug, Deserialize)]
pub struct IntentResponse {
    pub intent: String,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Deserialize)]
pub struct GoalResponse {
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanStepResponse {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PlanResponse {
    pub steps: Vec<PlanStepResponse>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub expected_duration_hours: Option<f64>,
    pub estimated_cost: i64,
}

#[derive(Debug, Deserialize)]
pub struct ObserverResponse {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PolicyResponse {
    #[serde(default)]
    pub extra_violation_notes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfidenceResponse {
    pub score: f64,
}
