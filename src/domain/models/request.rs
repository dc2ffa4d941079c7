//! Request domain model: the immutable input to an agent pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// One of the six municipal departments. Each owns a dedicated Rules
/// Engine, Tool Layer, and prompt set (SPEC_FULL §2 item 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Water,
    Engineering,
    Fire,
    Sanitation,
    Health,
    Finance,
}

impl AgentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Engineering => "engineering",
            Self::Fire => "fire",
            Self::Sanitation => "sanitation",
            Self::Health => "health",
            Self::Finance => "finance",
        }
    }

    /// The agent every unmapped request type falls through to
    /// (SPEC_FULL §6: "Engineering's intake already tolerates the widest
    /// variety of ad-hoc request shapes").
    #[must_use]
    pub const fn default_agent() -> Self {
        Self::Engineering
    }

    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Water,
            Self::Engineering,
            Self::Fire,
            Self::Sanitation,
            Self::Health,
            Self::Finance,
        ]
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request type string, normalized to lower snake_case at construction.
/// Kept as a thin string wrapper (rather than one large enum) because the
/// request-type → agent map in `config::agent_mapping` is the single
/// source of truth for what exists; this type just carries a validated,
/// normalized key into that table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestType(String);

impl RequestType {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase().replace([' ', '-'], "_"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Money in whole rupees. The source domain (municipal budgets) is
/// denominated in Indian rupees (SPEC_FULL §6 config defaults: ₹50L, and
/// scenario budgets in lakh/crore), so no fractional paise tracking is
/// needed at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    #[must_use]
    pub const fn rupees(amount: i64) -> Self {
        Self(amount)
    }

    #[must_use]
    pub const fn lakh(n: i64) -> Self {
        Self(n * 100_000)
    }

    #[must_use]
    pub const fn crore(n: i64) -> Self {
        Self(n * 1_00_00_000)
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

/// Immutable input to an agent pipeline (SPEC_FULL §3 "Request").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_type: RequestType,
    pub location: String,
    pub originator: String,
    #[serde(default)]
    pub estimated_cost: Option<Money>,
    #[serde(default)]
    pub resources_needed: BTreeSet<String>,
    /// Free-form per-type fields (e.g. `requested_shift_days`, `priority`).
    #[serde(default, flatten)]
    pub fields: std::collections::BTreeMap<String, Value>,
}

impl Request {
    /// Phase 1 input validation shared by every department: location must
    /// be non-empty. Type-specific required-field checks live in each
    /// department's `rules` module.
    #[must_use]
    pub fn basic_fields_present(&self) -> bool {
        !self.location.trim().is_empty() && !self.originator.trim().is_empty()
    }

    /// Convenience accessor for a free-form field as a string.
    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Convenience accessor for a free-form field as an i64.
    #[must_use]
    pub fn field_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }
}
