//! Port for the Context Store (SPEC_FULL §2 item 1): a read-only domain
//! snapshot provider keyed by location/zone. Treated as an external
//! collaborator (out of scope per spec.md §1) behind this trait.

use async_trait::async_trait;

use crate::domain::error::ToolError;
use crate::domain::models::ContextSnapshot;

#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Bulk read of everything Phase 2 needs for one location: active
    /// projects, schedules, worker availability, infrastructure health,
    /// budget remaining, recent incidents.
    async fn load_snapshot(&self, location: &str) -> Result<ContextSnapshot, ToolError>;
}
