//! Port for the pluggable human-intervention channel (SPEC_FULL §4.2).

use async_trait::async_trait;

use crate::domain::models::{HumanApprovalDecision, HumanApprovalRequest};

#[async_trait]
pub trait HumanApprovalChannel: Send + Sync {
    async fn request_approval(&self, request: HumanApprovalRequest) -> HumanApprovalDecision;
}
