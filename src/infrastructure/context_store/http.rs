//! HTTP-backed `ContextStore` implementation (SPEC_FULL §2 item 1). The
//! Context Store is an external collaborator the department agents never
//! write to; this adapter is a thin typed GET over its snapshot endpoint,
//! shaped on `llm::oracle::HttpLlmOracle`'s request plumbing.

use std::time::Duration;

use crate::domain::error::ToolError;
use crate::domain::models::{ContextSnapshot, ContextStoreConfig};
use crate::domain::ports::ContextStore;
use async_trait::async_trait;

pub struct HttpContextStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContextStore {
    #[must_use]
    pub fn new(config: &ContextStoreConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, base_url: config.base_url.clone() }
    }
}

#[async_trait]
impl ContextStore for HttpContextStore {
    async fn load_snapshot(&self, location: &str) -> Result<ContextSnapshot, ToolError> {
        let url = format!("{}/snapshot", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("location", location)])
            .send()
            .await
            .map_err(|e| ToolError::ContextUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::ContextUnavailable(format!("status {}", response.status())));
        }

        response.json::<ContextSnapshot>().await.map_err(|e| ToolError::ContextUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_snapshot_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "active_projects": ["main replacement"],
            "schedules": {},
            "worker_availability": {"crew-a": 3},
            "infrastructure_health": {},
            "budget_remaining": 500_000,
            "recent_incidents": [],
            "context_degraded": false,
        });
        let mock = server
            .mock("GET", "/snapshot")
            .match_query(mockito::Matcher::UrlEncoded("location".into(), "Ward 4".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let config = ContextStoreConfig { base_url: server.url(), timeout_ms: 3_000 };
        let store = HttpContextStore::new(&config);
        let snapshot = store.load_snapshot("Ward 4").await.unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.active_projects, vec!["main replacement".to_string()]);
        assert_eq!(snapshot.worker_availability.get("crew-a"), Some(&3));
    }

    #[tokio::test]
    async fn non_success_status_is_context_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/snapshot").match_query(mockito::Matcher::Any).with_status(503).create_async().await;

        let config = ContextStoreConfig { base_url: server.url(), timeout_ms: 3_000 };
        let store = HttpContextStore::new(&config);
        let result = store.load_snapshot("Ward 4").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ToolError::ContextUnavailable(_))));
    }
}
