//! Error types for the municipal decision-support core.
//!
//! Each enum corresponds to one of the error kinds in SPEC_FULL §7. They are
//! all `thiserror`-derived so phase code can propagate with `?` and the
//! pipeline can still map everything to a terminal decision at the edge.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while validating or running one agent pipeline phase.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Phase 1: request_type unknown to this agent, location empty, or a
    /// type-specific required field missing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Phase 5/9: retry budget exhausted mid-loop.
    #[error("retry budget exhausted after {0} attempts")]
    MaxRetriesExceeded(u32),

    /// Phase 6: checkpoint's human channel rejected the plan outright.
    #[error("human intervention rejected the plan: {0}")]
    HumanRejection(String),

    /// Wall-clock cap exceeded; Job Manager converts this into a failed job.
    #[error("job exceeded its wall-clock budget")]
    JobTimeout,

    /// Anything unexpected. Never allowed to panic out of the pipeline —
    /// always converted to this and carried to Output.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors from the Coordinator's dispatch / checkpoint / record-outcome API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),

    #[error("checkpoint timed out for location {0}")]
    CheckpointTimeout(String),

    #[error("coordination decision {0} not found")]
    DecisionNotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from the Tool Layer. A tool failure never aborts the pipeline; it
/// is recorded as a `ToolStepError` entry in `tool_results`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool call timed out")]
    Timeout,

    #[error("context store read failed: {0}")]
    ContextUnavailable(String),
}

/// Errors from the LLM adapter. Every variant is mapped to "no answer" by
/// the calling phase, which must have a deterministic fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("response was not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response did not match the expected schema: {0}")]
    SchemaMismatch(String),

    #[error("disabled for this call site")]
    Disabled,
}

impl LlmError {
    /// Whether a retry is worth attempting (network/timeout are transient;
    /// a malformed response will not fix itself on retry).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }
}

/// Errors from the SQLite-backed repositories.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("row not found")]
    RowNotFound,
}

impl DatabaseError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_))
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid confidence threshold: {0}, must be in [0,1]")]
    InvalidThreshold(f64),

    #[error("invalid max_retries: {0}, must be >= 1")]
    InvalidMaxRetries(u32),

    #[error("invalid cost_escalation_limit: {0}, must be > 0")]
    InvalidCostLimit(f64),

    #[error("invalid conflict_window_hours: {0}, must be > 0")]
    InvalidConflictWindow(i64),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("figment extraction failed: {0}")]
    ExtractionFailed(String),
}

/// Errors from the Job Manager.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {0} already in a terminal state")]
    AlreadyTerminal(Uuid),

    #[error("submission rate exceeded, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
}
