//! Engineering department rules (SPEC_FULL §4.3). This department also
//! absorbs every unmapped request type (`AgentType::default_agent`), so
//! its feasibility check degrades gracefully when observation data is
//! sparse rather than refusing outright. Observation keys populated by
//! `tools::engineering`: `inspector_available` (bool), `structural_risk`
//! (bool), `capacity_ok` (bool).

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

const MAX_CONCURRENT_PROJECTS_PER_LOCATION: i64 = 2;

pub fn feasibility(observations: &Observations, _request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("structural_risk") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("inspector_available") {
        Some(false) => FeasibilityVerdict::RepairableFailure {
            reason: "no inspector available before the requested date".into(),
        },
        Some(true) | None => {
            if observations.bool_field("capacity_ok") == Some(false) {
                return FeasibilityVerdict::RepairableFailure {
                    reason: "department capacity is currently saturated".into(),
                };
            }
            FeasibilityVerdict::Feasible
        }
    }
}

pub fn policy(observations: &Observations, request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if let Some(active) = observations.f64_field("active_projects_at_location") {
        if !is_emergency && active as i64 >= MAX_CONCURRENT_PROJECTS_PER_LOCATION {
            violations.push(format!(
                "location already has {active} active projects (cap {MAX_CONCURRENT_PROJECTS_PER_LOCATION})"
            ));
        }
    }

    if let Some(cost) = request.estimated_cost {
        if !is_emergency && cost.0 < 0 {
            violations.push("estimated cost cannot be negative".to_string());
        }
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_data_defaults_to_feasible() {
        let obs = Observations::default();
        let req = crate::domain::models::Request {
            request_type: crate::domain::models::request::RequestType::new("unmapped_oddity"),
            location: "City Hall".into(),
            originator: "intake".into(),
            estimated_cost: None,
            resources_needed: Default::default(),
            fields: Default::default(),
        };
        assert_eq!(feasibility(&obs, &req), FeasibilityVerdict::Feasible);
    }
}
