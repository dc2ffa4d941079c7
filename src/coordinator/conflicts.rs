//! Pure conflict detection (SPEC_FULL §4.2 "Conflict detection
//! algorithm"). Takes the already-queried candidate rows and a
//! checkpoint request, returns every conflict found; never touches
//! storage itself so it can be unit-tested without a repository.

use std::collections::{BTreeSet, HashMap, HashSet};

use uuid::Uuid;

use crate::domain::models::{CheckpointRequest, Conflict, CoordinationDecision, Money};

/// Location + resource conflicts, scoped to decisions active at the same
/// `location` (SPEC_FULL §4.2 rules 1-2).
#[must_use]
pub fn location_and_resource_conflicts(
    same_location: &[CoordinationDecision],
    candidate: &CheckpointRequest,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for d in same_location {
        if d.agent_type != candidate.agent_type {
            conflicts.push(Conflict::Location { with_decision: d.id, with_agent: d.agent_type });
        }

        let shared: BTreeSet<String> =
            d.resources_needed.intersection(&candidate.resources_needed).cloned().collect();
        if !shared.is_empty() {
            conflicts.push(Conflict::Resource { with_decision: d.id, shared });
        }
    }

    conflicts
}

/// Budget conflict, scoped to every active decision in the fiscal-scope
/// lookback window regardless of location (SPEC_FULL §4.2 rule 3).
#[must_use]
pub fn budget_conflict(
    all_active_in_window: &[CoordinationDecision],
    candidate_cost: Money,
    ceiling: Money,
) -> Option<Conflict> {
    let committed: i64 = all_active_in_window.iter().map(|d| d.estimated_cost.0).sum();
    let total = committed + candidate_cost.0;
    if total > ceiling.0 {
        Some(Conflict::Budget { total_with_plan: Money(total), ceiling })
    } else {
        None
    }
}

/// Whether the existing decisions active at this `location` already form
/// a cycle under the waits-for relation (SPEC_FULL §4.2 "Circular
/// dependency detection"). A new, not-yet-persisted request can only
/// surface a cycle that already exists among committed plans; it cannot
/// itself close a cycle before it has an id.
#[must_use]
pub fn circular_conflict(same_location: &[CoordinationDecision]) -> Option<Conflict> {
    let ids: HashSet<Uuid> = same_location.iter().map(|d| d.id).collect();
    let edges: HashMap<Uuid, Vec<Uuid>> = same_location
        .iter()
        .map(|d| (d.id, d.waits_for.iter().copied().filter(|w| ids.contains(w)).collect()))
        .collect();

    for &start in &ids {
        if let Some(cycle) = find_cycle_from(start, &edges) {
            return Some(Conflict::Circular { cycle });
        }
    }
    None
}

fn find_cycle_from(start: Uuid, edges: &HashMap<Uuid, Vec<Uuid>>) -> Option<Vec<Uuid>> {
    let mut path = vec![start];
    let mut visited = HashSet::new();
    visited.insert(start);
    walk(start, edges, &mut path, &mut visited)
}

fn walk(
    node: Uuid,
    edges: &HashMap<Uuid, Vec<Uuid>>,
    path: &mut Vec<Uuid>,
    visited: &mut HashSet<Uuid>,
) -> Option<Vec<Uuid>> {
    let Some(neighbors) = edges.get(&node) else { return None };
    for &next in neighbors {
        if next == path[0] && path.len() > 1 {
            let mut cycle = path.clone();
            cycle.push(next);
            return Some(cycle);
        }
        if visited.insert(next) {
            path.push(next);
            if let Some(cycle) = walk(next, edges, path, visited) {
                return Some(cycle);
            }
            path.pop();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AgentType, CoordinationStatus};
    use chrono::Utc;

    fn decision(agent: AgentType, location: &str, resources: &[&str]) -> CoordinationDecision {
        CoordinationDecision {
            id: Uuid::new_v4(),
            agent_type: agent,
            location: location.to_string(),
            resources_needed: resources.iter().map(|s| s.to_string()).collect(),
            estimated_cost: Money::lakh(10),
            status: CoordinationStatus::Active,
            created_at: Utc::now(),
            plan_summary: "test".into(),
            waits_for: BTreeSet::new(),
        }
    }

    fn candidate(agent: AgentType, location: &str, resources: &[&str], cost: Money) -> CheckpointRequest {
        CheckpointRequest {
            agent_type: agent,
            location: location.to_string(),
            resources_needed: resources.iter().map(|s| s.to_string()).collect(),
            estimated_cost: cost,
            plan_summary: "candidate".into(),
            waits_for: BTreeSet::new(),
            is_emergency: false,
        }
    }

    #[test]
    fn different_agent_same_location_is_a_location_conflict() {
        let existing = vec![decision(AgentType::Engineering, "Downtown", &[])];
        let cand = candidate(AgentType::Water, "Downtown", &[], Money::lakh(1));
        let conflicts = location_and_resource_conflicts(&existing, &cand);
        assert!(matches!(conflicts[0], Conflict::Location { .. }));
    }

    #[test]
    fn shared_resource_is_a_resource_conflict() {
        let existing = vec![decision(AgentType::Water, "Downtown", &["crew-a"])];
        let cand = candidate(AgentType::Water, "Downtown", &["crew-a"], Money::lakh(1));
        let conflicts = location_and_resource_conflicts(&existing, &cand);
        assert!(conflicts.iter().any(|c| matches!(c, Conflict::Resource { .. })));
    }

    #[test]
    fn budget_over_ceiling_is_flagged() {
        let existing = vec![decision(AgentType::Finance, "Downtown", &[]); 3];
        let conflict = budget_conflict(&existing, Money::crore(1), Money::crore(1));
        assert!(conflict.is_some());
    }

    #[test]
    fn budget_within_ceiling_is_not_flagged() {
        let existing = vec![];
        let conflict = budget_conflict(&existing, Money::lakh(10), Money::crore(1));
        assert!(conflict.is_none());
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut d1 = decision(AgentType::Water, "Downtown", &[]);
        d1.id = a;
        d1.waits_for = BTreeSet::from([b]);
        let mut d2 = decision(AgentType::Engineering, "Downtown", &[]);
        d2.id = b;
        d2.waits_for = BTreeSet::from([a]);
        assert!(circular_conflict(&[d1, d2]).is_some());
    }

    #[test]
    fn acyclic_waits_for_is_not_flagged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut d1 = decision(AgentType::Water, "Downtown", &[]);
        d1.id = a;
        let mut d2 = decision(AgentType::Engineering, "Downtown", &[]);
        d2.id = b;
        d2.waits_for = BTreeSet::from([a]);
        assert!(circular_conflict(&[d1, d2]).is_none());
    }
}
