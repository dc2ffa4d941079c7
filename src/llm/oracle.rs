//! HTTP-backed `LlmOracle` implementation (SPEC_FULL §4.5). Talks to the
//! configured provider's JSON completion endpoint; shaped on the
//! teacher's `infrastructure/claude/client.rs` request plumbing, narrowed
//! to the single `complete(prompt) -> text` contract the port needs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::domain::error::LlmError;
use crate::domain::models::LlmConfig;
use crate::domain::ports::LlmOracle;

pub struct HttpLlmOracle {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmOracle {
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[async_trait]
impl LlmOracle for HttpLlmOracle {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(LlmError::Disabled);
        };

        let body = json!({
            "model": self.config.model,
            "max_tokens": 1024,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LlmError::Network(format!("status {}", response.status())));
        }

        let parsed: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::InvalidJson(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| LlmError::InvalidJson("empty content array".to_string()))
    }
}
