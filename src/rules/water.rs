//! Water department rules (SPEC_FULL §4.3). Observation keys populated by
//! `tools::water` at Phase 8: `workers_available` (bool), `shift_conflict`
//! (bool), `water_quality_critical` (bool), `maintenance_window_ok` (bool).

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

const MAX_CONCURRENT_SHIFT_REQUESTS: i64 = 3;

pub fn feasibility(observations: &Observations, request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("water_quality_critical") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("workers_available") {
        Some(false) => FeasibilityVerdict::RepairableFailure {
            reason: "no available crew for the requested window".into(),
        },
        None => FeasibilityVerdict::RepairableFailure {
            reason: "worker availability could not be determined".into(),
        },
        Some(true) => {
            if observations.bool_field("maintenance_window_ok") == Some(false) {
                return FeasibilityVerdict::IrrecoverableFailure {
                    reason: "requested window falls inside a protected maintenance blackout".into(),
                };
            }
            let _ = request;
            FeasibilityVerdict::Feasible
        }
    }
}

pub fn policy(observations: &Observations, request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if !is_emergency && observations.bool_field("shift_conflict") == Some(true) {
        violations.push("overlapping shift already scheduled for this crew".to_string());
    }

    if let Some(days) = request.field_i64("requested_shift_days") {
        if !is_emergency && days > MAX_CONCURRENT_SHIFT_REQUESTS {
            violations.push(format!(
                "shift span of {days} days exceeds the {MAX_CONCURRENT_SHIFT_REQUESTS}-day routine cap"
            ));
        }
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn req() -> Request {
        Request {
            request_type: crate::domain::models::request::RequestType::new("schedule_shift_request"),
            location: "Sector 4".into(),
            originator: "dispatch".into(),
            estimated_cost: None,
            resources_needed: BTreeSet::new(),
            fields: Default::default(),
        }
    }

    #[test]
    fn routine_shift_with_available_crew_is_feasible() {
        let mut obs = Observations::default();
        obs.set("workers_available", true);
        obs.set("maintenance_window_ok", true);
        assert_eq!(feasibility(&obs, &req()), FeasibilityVerdict::Feasible);
    }

    #[test]
    fn no_crew_is_repairable() {
        let mut obs = Observations::default();
        obs.set("workers_available", false);
        assert!(matches!(feasibility(&obs, &req()), FeasibilityVerdict::RepairableFailure { .. }));
    }

    #[test]
    fn blackout_window_is_irrecoverable() {
        let mut obs = Observations::default();
        obs.set("workers_available", true);
        obs.set("maintenance_window_ok", false);
        assert!(matches!(feasibility(&obs, &req()), FeasibilityVerdict::IrrecoverableFailure { .. }));
    }

    #[test]
    fn water_quality_incident_bypasses_crew_check() {
        let mut obs = Observations::default();
        obs.set("water_quality_critical", true);
        assert_eq!(feasibility(&obs, &req()), FeasibilityVerdict::Feasible);
    }
}
