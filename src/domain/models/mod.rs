//! Domain models for the municipal decision-support core.

pub mod audit;
pub mod config;
pub mod coordination;
pub mod job;
pub mod request;
pub mod state;

pub use audit::AuditRecord;
pub use config::{
    Config, ContextStoreConfig, DatabaseConfig, LlmConfig, LlmFlags, LoggingConfig, RateLimitConfig, RetryConfig,
};
pub use coordination::{
    ApprovalOption, CheckpointRequest, Conflict, CoordinationDecision, CoordinationStatus,
    HumanApprovalDecision, HumanApprovalRequest, Urgency, Verdict,
};
pub use job::{CancellationFlag, Job, JobErrorPayload, JobStatus};
pub use request::{AgentType, Money, Request, RequestType};
pub use state::{
    AgentState, CheckpointVerdict, ContextSnapshot, CoordinationCheck, Decision, FeasibilityVerdict,
    Observations, OutputDetails, PipelineOutput, Plan, PlanStep, PolicyVerdict, RecommendationPayload,
    RiskLevel, ToolResult,
};
