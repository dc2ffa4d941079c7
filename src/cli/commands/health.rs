//! Health CLI command: the same liveness check `muniops-server` exposes
//! over `GET /api/v1/health`, run in-process for operators without a
//! running server.

use anyhow::Result;
use serde_json::Value;

use crate::cli::output::{output, CommandOutput};
use crate::cli::runtime::bootstrap;

#[derive(Debug, serde::Serialize)]
pub struct HealthOutput {
    pub status: &'static str,
    pub coordinator: &'static str,
    pub version: &'static str,
}

impl CommandOutput for HealthOutput {
    fn to_human(&self) -> String {
        format!("status: {}, coordinator: {}, version: {}", self.status, self.coordinator, self.version)
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(json_mode: bool) -> Result<()> {
    let runtime = bootstrap().await?;
    let coordinator_up = sqlx::query("SELECT 1").execute(&runtime.db_pool).await.is_ok();
    output(
        &HealthOutput {
            status: if coordinator_up { "ok" } else { "degraded" },
            coordinator: if coordinator_up { "up" } else { "down" },
            version: env!("CARGO_PKG_VERSION"),
        },
        json_mode,
    );
    Ok(())
}
