//! The Rules Engine (SPEC_FULL §4.3): deterministic per-department
//! predicates — feasibility rules, policy rules, and the confidence
//! calculator. Partitioned into one module per department, following the
//! teacher's `services/overseers/*` style (one file per concern, a
//! shared contract in the parent module) rather than per-department
//! trait objects, since dispatch is a compile-time-known `match` over
//! `AgentType` and never needs dynamic plugin loading.

pub mod engineering;
pub mod finance;
pub mod fire;
pub mod health;
pub mod sanitation;
pub mod water;

use crate::domain::models::{AgentType, FeasibilityVerdict, Observations, PolicyVerdict, Request};

/// Per-intent feasibility check. The Rules Engine is the *only* authority
/// for `feasible` — an LLM-produced observation may feed it data, but
/// never overrules its verdict (SPEC_FULL §4.3).
#[must_use]
pub fn feasibility(agent: AgentType, observations: &Observations, request: &Request) -> FeasibilityVerdict {
    match agent {
        AgentType::Water => water::feasibility(observations, request),
        AgentType::Engineering => engineering::feasibility(observations, request),
        AgentType::Fire => fire::feasibility(observations, request),
        AgentType::Sanitation => sanitation::feasibility(observations, request),
        AgentType::Health => health::feasibility(observations, request),
        AgentType::Finance => finance::feasibility(observations, request),
    }
}

/// Department policy constants with emergency-override provisions
/// (SPEC_FULL §4.3). The pass/fail verdict is rules-owned even when an
/// LLM produced the human-readable violation text.
#[must_use]
pub fn policy(
    agent: AgentType,
    observations: &Observations,
    request: &Request,
    is_emergency: bool,
) -> PolicyVerdict {
    match agent {
        AgentType::Water => water::policy(observations, request, is_emergency),
        AgentType::Engineering => engineering::policy(observations, request, is_emergency),
        AgentType::Fire => fire::policy(observations, request, is_emergency),
        AgentType::Sanitation => sanitation::policy(observations, request, is_emergency),
        AgentType::Health => health::policy(observations, request, is_emergency),
        AgentType::Finance => finance::policy(observations, request, is_emergency),
    }
}

/// Inputs to the deterministic confidence calculator (SPEC_FULL §4.3).
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs {
    pub feasible: bool,
    pub policy_ok: bool,
    pub risk_low: bool,
    pub risk_medium: bool,
    pub risk_high: bool,
    pub risk_critical: bool,
    pub data_complete: bool,
    pub retry_count: u32,
    pub violation_count: u32,
}

/// Weighted confidence score in `[0, 1]` (SPEC_FULL §4.3).
///
/// Starting point: the spec lists only *deltas* ("feasibility pass
/// +0.25", "policy pass +0.20", ...) with no stated baseline. A baseline
/// of `0.5` was chosen (SPEC_FULL §9 open-question resolution style) so
/// that a routine, feasible, policy-compliant, low-risk, complete-data
/// request clears the default `CONFIDENCE_THRESHOLD` of `0.7` with
/// headroom — matching concrete scenario 1 ("routine water shift"
/// expects confidence ≥ 0.8).
#[must_use]
pub fn confidence(inputs: ConfidenceInputs) -> f64 {
    let mut score = 0.5;

    if inputs.feasible {
        score += 0.25;
    }
    if inputs.policy_ok {
        score += 0.20;
    }

    if inputs.risk_low {
        score += 0.15;
    } else if inputs.risk_high {
        score -= 0.15;
    } else if inputs.risk_critical {
        score -= 0.25;
    }
    // risk_medium contributes 0, left out intentionally.

    score += if inputs.data_complete { 0.10 } else { 0.05 };

    score -= 0.10 * f64::from(inputs.retry_count);
    score -= 0.05 * f64::from(inputs.violation_count);

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base_inputs() -> ConfidenceInputs {
        ConfidenceInputs {
            feasible: true,
            policy_ok: true,
            risk_low: true,
            risk_medium: false,
            risk_high: false,
            risk_critical: false,
            data_complete: true,
            retry_count: 0,
            violation_count: 0,
        }
    }

    #[test]
    fn routine_case_clears_default_threshold_with_headroom() {
        let score = confidence(base_inputs());
        assert!(score >= 0.8, "expected >= 0.8, got {score}");
    }

    #[test]
    fn high_risk_with_violations_drags_score_down() {
        let inputs = ConfidenceInputs {
            risk_low: false,
            risk_high: true,
            policy_ok: false,
            violation_count: 3,
            retry_count: 2,
            ..base_inputs()
        };
        let score = confidence(inputs);
        assert!(score < 0.5, "expected a penalized score, got {score}");
    }

    proptest! {
        #[test]
        fn confidence_is_always_in_unit_interval(
            feasible: bool, policy_ok: bool, risk_low: bool, risk_high: bool,
            risk_critical: bool, data_complete: bool,
            retry_count in 0u32..20, violation_count in 0u32..20,
        ) {
            let inputs = ConfidenceInputs {
                feasible, policy_ok, risk_low,
                risk_medium: !risk_low && !risk_high && !risk_critical,
                risk_high, risk_critical, data_complete, retry_count, violation_count,
            };
            let score = confidence(inputs);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
