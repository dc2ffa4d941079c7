//! Finance department rules (SPEC_FULL §4.3). Observation keys:
//! `budget_available` (bool), `audit_flag` (bool), `over_ceiling` (bool).
//! Finance is the department whose policy check most directly gates the
//! cost-escalation logic the Coordinator also enforces at checkpoints.

use crate::domain::models::{FeasibilityVerdict, Observations, PolicyVerdict, Request};

pub fn feasibility(observations: &Observations, _request: &Request) -> FeasibilityVerdict {
    if observations.bool_field("audit_flag") == Some(true) {
        return FeasibilityVerdict::Feasible;
    }

    match observations.bool_field("budget_available") {
        Some(false) => FeasibilityVerdict::IrrecoverableFailure {
            reason: "insufficient remaining budget for this fiscal period".into(),
        },
        _ => FeasibilityVerdict::Feasible,
    }
}

pub fn policy(observations: &Observations, request: &Request, is_emergency: bool) -> PolicyVerdict {
    let mut violations = Vec::new();

    if !is_emergency && observations.bool_field("over_ceiling") == Some(true) {
        violations.push("requested expenditure exceeds the departmental approval ceiling".to_string());
    }

    if let Some(cost) = request.estimated_cost {
        if cost.0 == 0 && request.request_type.as_str() == "expenditure_approval" {
            violations.push("expenditure approval requires a non-zero estimated cost".to_string());
        }
    }

    PolicyVerdict { ok: violations.is_empty(), violations }
}
