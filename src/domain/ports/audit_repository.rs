//! Port for the Audit Log (SPEC_FULL §2 item 8): append-only persistence
//! of `AuditRecord`s, written at Phase 11.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::CoordinatorError;
use crate::domain::models::AuditRecord;

#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append a record. Idempotent by `record.id` (SPEC_FULL §8
    /// "RecordOutcome is idempotent by `audit_id`"): calling this twice
    /// with the same id must not create a second row.
    async fn append(&self, record: AuditRecord) -> Result<(), CoordinatorError>;

    async fn get(&self, id: Uuid) -> Result<Option<AuditRecord>, CoordinatorError>;
}
