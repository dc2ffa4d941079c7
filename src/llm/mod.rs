//! LLM Adapter (SPEC_FULL §4.5): the port, its HTTP implementation, the
//! retry policy, code-fence stripping, and the per-call facade every
//! pipeline phase goes through.

pub mod adapter;
pub mod fences;
pub mod oracle;
pub mod retry;

pub use adapter::{CallSite, LlmAdapter};
pub use oracle::HttpLlmOracle;
