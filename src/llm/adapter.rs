//! The LLM Adapter (SPEC_FULL §4.5): the single choke point every phase
//! calls through. Encapsulates the per-call `USE_LLM_FOR_*` flag, the
//! timeout, retrying transient failures, code-fence stripping, and JSON
//! parsing. On any failure the caller gets `None` ("no answer") and must
//! supply its own deterministic fallback — the adapter never decides
//! what a missing answer means.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::error::LlmError;
use crate::domain::models::{LlmConfig, RetryConfig};
use crate::domain::ports::LlmOracle;
use crate::llm::fences::strip_code_fences;
use crate::llm::retry::RetryPolicy;

/// Which phase is calling, purely for logging/metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    Intent,
    Goal,
    Planner,
    Observer,
    Policy,
    Confidence,
}

impl CallSite {
    const fn label(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Goal => "goal",
            Self::Planner => "planner",
            Self::Observer => "observer",
            Self::Policy => "policy",
            Self::Confidence => "confidence",
        }
    }
}

pub struct LlmAdapter {
    oracle: Arc<dyn LlmOracle>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl LlmAdapter {
    #[must_use]
    pub fn new(oracle: Arc<dyn LlmOracle>, llm: &LlmConfig, retry: &RetryConfig) -> Self {
        Self { oracle, retry: RetryPolicy::from(retry), timeout: Duration::from_millis(llm.timeout_ms) }
    }

    /// Runs one JSON-in/JSON-out call. Returns `None` when `enabled` is
    /// false, or on any network/timeout/parse/schema failure after
    /// retries are exhausted — the phase must fall back deterministically
    /// in that case (SPEC_FULL §4.5).
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        site: CallSite,
        enabled: bool,
        prompt: &str,
    ) -> Option<T> {
        if !enabled {
            debug!(call_site = site.label(), "llm call disabled, skipping to fallback");
            return None;
        }

        let attempt = self.retry.execute(|| async {
            let raw = tokio::time::timeout(self.timeout, self.oracle.complete(prompt))
                .await
                .map_err(|_| LlmError::Timeout)??;
            Ok(raw)
        });

        match attempt.await {
            Ok(raw) => {
                let cleaned = strip_code_fences(&raw);
                match serde_json::from_str::<T>(cleaned) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(call_site = site.label(), error = %e, "llm response failed schema parse");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(call_site = site.label(), error = %e, "llm call failed, falling back");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubOracle {
        response: String,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmOracle for StubOracle {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Payload {
        ok: bool,
    }

    #[tokio::test]
    async fn disabled_call_site_short_circuits_without_invoking_oracle() {
        let oracle = Arc::new(StubOracle { response: "{\"ok\":true}".into(), calls: AtomicU32::new(0) });
        let adapter = LlmAdapter::new(oracle.clone(), &LlmConfig::default(), &RetryConfig::default());
        let result: Option<Payload> = adapter.complete_json(CallSite::Planner, false, "prompt").await;
        assert_eq!(result, None);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fenced_json_is_parsed() {
        let oracle =
            Arc::new(StubOracle { response: "```json\n{\"ok\":true}\n```".into(), calls: AtomicU32::new(0) });
        let adapter = LlmAdapter::new(oracle, &LlmConfig::default(), &RetryConfig::default());
        let result: Option<Payload> = adapter.complete_json(CallSite::Observer, true, "prompt").await;
        assert_eq!(result, Some(Payload { ok: true }));
    }

    #[tokio::test]
    async fn malformed_json_yields_none_not_a_panic() {
        let oracle = Arc::new(StubOracle { response: "not json".into(), calls: AtomicU32::new(0) });
        let adapter = LlmAdapter::new(oracle, &LlmConfig::default(), &RetryConfig::default());
        let result: Option<Payload> = adapter.complete_json(CallSite::Intent, true, "prompt").await;
        assert_eq!(result, None);
    }
}
