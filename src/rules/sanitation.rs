//! Sanitation department rules (SPEC_FULL §4.3). Observation keys:
//! `crew_available` (bool), `bin_capacity_ok` (bool), `illegal_dump_hazard`
//! (bool).

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

pub fn feasibility(observations: &Observations, _request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("illegal_dump_hazard") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("crew_available") {
        Some(false) => FeasibilityVerdict::RepairableFailure {
            reason: "no collection crew available for the requested route".into(),
        },
        _ => {
            if observations.bool_field("bin_capacity_ok") == Some(false) {
                return FeasibilityVerdict::RepairableFailure {
                    reason: "bin capacity at this location is already at limit".into(),
                };
            }
            FeasibilityVerdict::Feasible
        }
    }
}

pub fn policy(_observations: &Observations, request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if !is_emergency {
        if let Some(priority) = request.field_str("priority") {
            if priority.eq_ignore_ascii_case("low") && request.field_i64("requested_shift_days").unwrap_or(0) > 7 {
                violations.push("low-priority routes cannot be scheduled more than 7 days out".to_string());
            }
        }
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}
