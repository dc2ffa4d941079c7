//! Port for the LLM Oracle (SPEC_FULL §2 item 4, §4.5): a JSON-in/JSON-out
//! external call. The port itself only knows about raw text completion;
//! code-fence stripping and JSON-schema validation happen one layer up in
//! `infrastructure::llm::adapter`, which is what phases actually call.

use async_trait::async_trait;

use crate::domain::error::LlmError;

#[async_trait]
pub trait LlmOracle: Send + Sync {
    /// Send `prompt` to the oracle and return its raw text completion.
    /// Implementations must honor the adapter's per-call timeout and map
    /// any failure to an `LlmError` variant — never panic.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
