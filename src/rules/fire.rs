//! Fire department rules (SPEC_FULL §4.3). Owns `fire_emergency` and
//! `inspection_request` (the Fire/Engineering naming collision resolved
//! in SPEC_FULL §9). Observation keys: `apparatus_available` (bool),
//! `life_safety_risk` (bool), `inspection_overdue` (bool).

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

pub fn feasibility(observations: &Observations, _request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("life_safety_risk") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("apparatus_available") {
        Some(false) => FeasibilityVerdict::RepairableFailure {
            reason: "no apparatus/crew available in the requested window".into(),
        },
        _ => FeasibilityVerdict::Feasible,
    }
}

pub fn policy(observations: &Observations, _request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if !is_emergency && observations.bool_field("inspection_overdue") == Some(true) {
        violations.push("site has an overdue mandatory inspection outstanding".to_string());
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_safety_risk_is_always_feasible() {
        let mut obs = Observations::default();
        obs.set("life_safety_risk", true);
        obs.set("apparatus_available", false);
        let req = crate::domain::models::Request {
            request_type: crate::domain::models::request::RequestType::new("fire_emergency"),
            location: "Block 9".into(),
            originator: "dispatch".into(),
            estimated_cost: None,
            resources_needed: Default::default(),
            fields: Default::default(),
        };
        assert_eq!(feasibility(&obs, &req), FeasibilityVerdict::Feasible);
    }
}
