//! Health department rules (SPEC_FULL §4.3). Observation keys:
//! `inspector_available` (bool), `outbreak_risk` (bool),
//! `permit_compliant` (bool).

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

pub fn feasibility(observations: &Observations, _request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("outbreak_risk") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("inspector_available") {
        Some(false) => FeasibilityVerdict::RepairableFailure {
            reason: "no health inspector available before the requested date".into(),
        },
        _ => FeasibilityVerdict::Feasible,
    }
}

pub fn policy(observations: &Observations, _request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if !is_emergency && observations.bool_field("permit_compliant") == Some(false) {
        violations.push("establishment lacks a valid food-safety permit on file".to_string());
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}
