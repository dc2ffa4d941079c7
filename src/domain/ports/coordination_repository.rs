//! Port for the `coordination_decisions` table (SPEC_FULL §3, §4.2): the
//! single shared-mutable datum all conflict logic queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::CoordinatorError;
use crate::domain::models::{CoordinationDecision, CoordinationStatus};

#[async_trait]
pub trait CoordinationRepository: Send + Sync {
    /// Rows with `status = active` and `created_at > since`, restricted
    /// to `location` (SPEC_FULL §4.2 "Conflict detection algorithm").
    async fn active_for_location(
        &self,
        location: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CoordinationDecision>, CoordinatorError>;

    /// All active rows within the lookback window, for budget-conflict
    /// and circular-dependency checks that span locations in the same
    /// fiscal scope.
    async fn active_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<CoordinationDecision>, CoordinatorError>;

    async fn insert(&self, decision: CoordinationDecision) -> Result<(), CoordinatorError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: CoordinationStatus,
    ) -> Result<(), CoordinatorError>;

    async fn get(&self, id: Uuid) -> Result<Option<CoordinationDecision>, CoordinatorError>;
}
