//! Ports: the boundary traits every external collaborator (Context
//! Store, LLM Oracle, repositories, human channel) implements, following
//! the hexagonal split the teacher crate uses throughout `domain/ports`.

pub mod audit_repository;
pub mod context_store;
pub mod coordination_repository;
pub mod human_channel;
pub mod llm_oracle;

pub use audit_repository::AuditRepository;
pub use context_store::ContextStore;
pub use coordination_repository::CoordinationRepository;
pub use human_channel::HumanApprovalChannel;
pub use llm_oracle::LlmOracle;
