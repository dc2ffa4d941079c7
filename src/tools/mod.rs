//! The Tool Layer (SPEC_FULL §4.4): typed, side-effect-free queries over
//! the Context Store snapshot already loaded at Phase 2. Grounded in the
//! teacher's `adapter_registry.rs` name-keyed lookup pattern, but here the
//! registry maps directly to plain functions rather than trait objects —
//! every tool has the same signature (`&ContextSnapshot, &Request,
//! &BTreeMap<String, Value> -> Value`) and needs no per-tool state, so a
//! `fn` pointer table is enough. The third argument is the calling plan
//! step's own arguments, so a replanned step (SPEC_FULL §9 "retries
//! constrain the existing plan") can steer a tool's verdict without the
//! tool reaching back into the plan itself.

pub mod engineering;
pub mod finance;
pub mod fire;
pub mod health;
pub mod sanitation;
pub mod water;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::error::ToolError;
use crate::domain::models::{AgentType, ContextSnapshot, Request};

pub type ToolFn = fn(&ContextSnapshot, &Request, &BTreeMap<String, Value>) -> Value;

/// Tool names whose `arguments["crew"]` entry selects which
/// `worker_availability` key they check, used by the Phase 9 repair step
/// (`pipeline::fallback::repair_crew_argument`) to retarget a retry onto an
/// alternate crew instead of re-checking the one that was already short.
pub const CREW_AWARE_TOOLS: &[&str] = &[
    "check_manpower",
    "check_inspector_availability",
    "check_apparatus_availability",
    "check_crew_availability",
];

/// Name-keyed table of a department's tools. Unknown names are a
/// `ToolError::UnknownTool`, recorded by the executor as a step error
/// rather than propagated (SPEC_FULL §4.4 "do not throw").
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolFn>,
}

impl ToolRegistry {
    #[must_use]
    pub fn for_agent(agent: AgentType) -> Self {
        let tools: BTreeMap<&'static str, ToolFn> = match agent {
            AgentType::Water => water::TOOLS.iter().copied().collect(),
            AgentType::Engineering => engineering::TOOLS.iter().copied().collect(),
            AgentType::Fire => fire::TOOLS.iter().copied().collect(),
            AgentType::Sanitation => sanitation::TOOLS.iter().copied().collect(),
            AgentType::Health => health::TOOLS.iter().copied().collect(),
            AgentType::Finance => finance::TOOLS.iter().copied().collect(),
        };
        Self { tools }
    }

    /// Runs a single named tool. Never panics; an unknown name or a
    /// panicking tool body would both be caller bugs, not runtime faults,
    /// so this only needs to report the name-lookup failure.
    pub fn call(
        &self,
        name: &str,
        context: &ContextSnapshot,
        request: &Request,
        arguments: &BTreeMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        Ok(tool(context, request, arguments))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_is_an_error_not_a_panic() {
        let registry = ToolRegistry::for_agent(AgentType::Water);
        let context = ContextSnapshot::default();
        let request = Request {
            request_type: crate::domain::models::request::RequestType::new("schedule_shift_request"),
            location: "X".into(),
            originator: "Y".into(),
            estimated_cost: None,
            resources_needed: Default::default(),
            fields: Default::default(),
        };
        assert!(registry.call("does_not_exist", &context, &request, &BTreeMap::new()).is_err());
    }

    #[test]
    fn every_agent_has_a_non_empty_registry() {
        for agent in AgentType::all() {
            assert!(!ToolRegistry::for_agent(agent).names().is_empty());
        }
    }
}
