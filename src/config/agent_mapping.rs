//! Static request-type → agent map (SPEC_FULL §6).
//!
//! This is the single authoritative mapping the source documents
//! disagreed on. Resolution of the documented duplicate
//! (`inspection_request` appeared under both Fire and Engineering):
//! Fire owns `inspection_request` (fire-code inspections are the
//! higher-risk, higher-frequency case); Engineering's analogous request is
//! renamed `structural_inspection_request` here. See SPEC_FULL §9.

use crate::domain::models::request::{AgentType, RequestType};

/// One row of the static map.
struct MappingEntry {
    request_type: &'static str,
    agent: AgentType,
}

const MAP: &[MappingEntry] = &[
    // Water
    MappingEntry { request_type: "schedule_shift_request", agent: AgentType::Water },
    MappingEntry { request_type: "maintenance_request", agent: AgentType::Water },
    MappingEntry { request_type: "water_quality_incident", agent: AgentType::Water },
    MappingEntry { request_type: "pipeline_repair_request", agent: AgentType::Water },
    // Engineering
    MappingEntry { request_type: "project_planning", agent: AgentType::Engineering },
    MappingEntry { request_type: "capacity_query", agent: AgentType::Engineering },
    MappingEntry { request_type: "structural_inspection_request", agent: AgentType::Engineering },
    MappingEntry { request_type: "permit_review", agent: AgentType::Engineering },
    MappingEntry { request_type: "infrastructure_failure", agent: AgentType::Engineering },
    // Fire
    MappingEntry { request_type: "fire_emergency", agent: AgentType::Fire },
    MappingEntry { request_type: "inspection_request", agent: AgentType::Fire },
    MappingEntry { request_type: "training_schedule_request", agent: AgentType::Fire },
    // Sanitation
    MappingEntry { request_type: "collection_schedule_request", agent: AgentType::Sanitation },
    MappingEntry { request_type: "illegal_dumping_report", agent: AgentType::Sanitation },
    MappingEntry { request_type: "bin_capacity_query", agent: AgentType::Sanitation },
    // Health
    MappingEntry { request_type: "health_inspection_request", agent: AgentType::Health },
    MappingEntry { request_type: "outbreak_report", agent: AgentType::Health },
    MappingEntry { request_type: "food_safety_permit_request", agent: AgentType::Health },
    // Finance
    MappingEntry { request_type: "budget_request", agent: AgentType::Finance },
    MappingEntry { request_type: "expenditure_approval", agent: AgentType::Finance },
    MappingEntry { request_type: "audit_request", agent: AgentType::Finance },
];

/// Resolve a request type to the agent that owns it. Unknown types fall
/// through to `AgentType::default_agent()` (Engineering), as documented.
#[must_use]
pub fn resolve(request_type: &RequestType) -> AgentType {
    MAP.iter()
        .find(|entry| entry.request_type == request_type.as_str())
        .map_or_else(AgentType::default_agent, |entry| entry.agent)
}

/// The request types explicitly owned by `agent` (used by Phase 1 to
/// reject a type that reached the wrong department directly, bypassing
/// the Coordinator's own routing).
#[must_use]
pub fn owned_types(agent: AgentType) -> Vec<&'static str> {
    MAP.iter()
        .filter(|entry| entry.agent == agent)
        .map(|entry| entry.request_type)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_owns_inspection_request() {
        assert_eq!(resolve(&RequestType::new("inspection_request")), AgentType::Fire);
    }

    #[test]
    fn engineering_owns_structural_inspection_request() {
        assert_eq!(
            resolve(&RequestType::new("structural_inspection_request")),
            AgentType::Engineering
        );
    }

    #[test]
    fn unknown_type_falls_through_to_default_agent() {
        assert_eq!(resolve(&RequestType::new("never_heard_of_this")), AgentType::default_agent());
    }

    #[test]
    fn every_agent_owns_at_least_one_type() {
        for agent in AgentType::all() {
            assert!(!owned_types(agent).is_empty(), "{agent} owns no request types");
        }
    }
}
