//! `SQLite` implementation of `CoordinationRepository` (SPEC_FULL §3, §4.2).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::domain::error::CoordinatorError;
use crate::domain::models::{AgentType, CoordinationDecision, CoordinationStatus, Money};
use crate::domain::ports::CoordinationRepository;

pub struct CoordinationRepositoryImpl {
    pool: SqlitePool,
}

impl CoordinationRepositoryImpl {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Raw row shape, parsed into `CoordinationDecision` by `parse_row`. Kept
/// as its own struct so the JSON-column decoding lives in one place.
#[derive(FromRow)]
struct DecisionRow {
    id: String,
    agent_type: String,
    location: String,
    resources_needed: String,
    estimated_cost: i64,
    status: String,
    created_at: String,
    plan_summary: String,
    waits_for: String,
}

fn parse_agent_type(raw: &str) -> Result<AgentType, CoordinatorError> {
    AgentType::all()
        .into_iter()
        .find(|a| a.as_str() == raw)
        .ok_or_else(|| CoordinatorError::Storage(format!("unknown agent_type in row: {raw}")))
}

fn parse_status(raw: &str) -> Result<CoordinationStatus, CoordinatorError> {
    match raw {
        "active" => Ok(CoordinationStatus::Active),
        "completed" => Ok(CoordinationStatus::Completed),
        "superseded" => Ok(CoordinationStatus::Superseded),
        other => Err(CoordinatorError::Storage(format!("unknown status in row: {other}"))),
    }
}

fn parse_row(row: DecisionRow) -> Result<CoordinationDecision, CoordinatorError> {
    let id = Uuid::parse_str(&row.id)
        .map_err(|e| CoordinatorError::Storage(format!("invalid decision id: {e}")))?;
    let resources_needed: BTreeSet<String> = serde_json::from_str(&row.resources_needed)
        .map_err(|e| CoordinatorError::Storage(format!("invalid resources_needed json: {e}")))?;
    let waits_for: BTreeSet<Uuid> = serde_json::from_str(&row.waits_for)
        .map_err(|e| CoordinatorError::Storage(format!("invalid waits_for json: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| CoordinatorError::Storage(format!("invalid created_at: {e}")))?
        .with_timezone(&Utc);

    Ok(CoordinationDecision {
        id,
        agent_type: parse_agent_type(&row.agent_type)?,
        location: row.location,
        resources_needed,
        estimated_cost: Money::rupees(row.estimated_cost),
        status: parse_status(&row.status)?,
        created_at,
        plan_summary: row.plan_summary,
        waits_for,
    })
}

fn status_str(status: CoordinationStatus) -> &'static str {
    match status {
        CoordinationStatus::Active => "active",
        CoordinationStatus::Completed => "completed",
        CoordinationStatus::Superseded => "superseded",
    }
}

#[async_trait]
impl CoordinationRepository for CoordinationRepositoryImpl {
    async fn active_for_location(
        &self,
        location: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CoordinationDecision>, CoordinatorError> {
        let since_str = since.to_rfc3339();
        let rows: Vec<DecisionRow> = sqlx::query_as(
            "SELECT id, agent_type, location, resources_needed, estimated_cost, status, \
             created_at, plan_summary, waits_for FROM coordination_decisions \
             WHERE location = ? AND status = 'active' AND created_at > ? \
             ORDER BY created_at ASC",
        )
        .bind(location)
        .bind(since_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        rows.into_iter().map(parse_row).collect()
    }

    async fn active_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<CoordinationDecision>, CoordinatorError> {
        let since_str = since.to_rfc3339();
        let rows: Vec<DecisionRow> = sqlx::query_as(
            "SELECT id, agent_type, location, resources_needed, estimated_cost, status, \
             created_at, plan_summary, waits_for FROM coordination_decisions \
             WHERE status = 'active' AND created_at > ? ORDER BY created_at ASC",
        )
        .bind(since_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        rows.into_iter().map(parse_row).collect()
    }

    async fn insert(&self, decision: CoordinationDecision) -> Result<(), CoordinatorError> {
        let id_str = decision.id.to_string();
        let agent_type_str = decision.agent_type.as_str();
        let resources_json = serde_json::to_string(&decision.resources_needed)
            .map_err(|e| CoordinatorError::Storage(e.to_string()))?;
        let waits_for_json = serde_json::to_string(&decision.waits_for)
            .map_err(|e| CoordinatorError::Storage(e.to_string()))?;
        let created_at_str = decision.created_at.to_rfc3339();

        sqlx::query(
            "INSERT INTO coordination_decisions \
             (id, agent_type, location, resources_needed, estimated_cost, status, \
              created_at, plan_summary, waits_for) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id_str)
        .bind(agent_type_str)
        .bind(decision.location)
        .bind(resources_json)
        .bind(decision.estimated_cost.0)
        .bind(status_str(decision.status))
        .bind(created_at_str)
        .bind(decision.plan_summary)
        .bind(waits_for_json)
        .execute(&self.pool)
        .await
        .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: CoordinationStatus,
    ) -> Result<(), CoordinatorError> {
        let id_str = id.to_string();
        let result = sqlx::query("UPDATE coordination_decisions SET status = ? WHERE id = ?")
            .bind(status_str(status))
            .bind(id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CoordinatorError::DecisionNotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<CoordinationDecision>, CoordinatorError> {
        let id_str = id.to_string();
        let row: Option<DecisionRow> = sqlx::query_as(
            "SELECT id, agent_type, location, resources_needed, estimated_cost, status, \
             created_at, plan_summary, waits_for FROM coordination_decisions WHERE id = ?",
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        row.map(parse_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::DatabasePool;

    async fn repo() -> CoordinationRepositoryImpl {
        let db = DatabasePool::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        CoordinationRepositoryImpl::new(db.pool())
    }

    fn sample() -> CoordinationDecision {
        CoordinationDecision {
            id: Uuid::new_v4(),
            agent_type: AgentType::Water,
            location: "Ward 4".into(),
            resources_needed: BTreeSet::from(["crew-a".to_string()]),
            estimated_cost: Money::lakh(5),
            status: CoordinationStatus::Active,
            created_at: Utc::now(),
            plan_summary: "repair main".into(),
            waits_for: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn inserts_and_round_trips() {
        let repo = repo().await;
        let decision = sample();
        repo.insert(decision.clone()).await.unwrap();

        let fetched = repo.get(decision.id).await.unwrap().unwrap();
        assert_eq!(fetched.location, decision.location);
        assert_eq!(fetched.estimated_cost, decision.estimated_cost);
        assert_eq!(fetched.agent_type, decision.agent_type);
    }

    #[tokio::test]
    async fn active_for_location_filters_by_status_and_window() {
        let repo = repo().await;
        let decision = sample();
        repo.insert(decision.clone()).await.unwrap();

        let since = Utc::now() - chrono::Duration::hours(1);
        let found = repo.active_for_location("Ward 4", since).await.unwrap();
        assert_eq!(found.len(), 1);

        repo.set_status(decision.id, CoordinationStatus::Completed).await.unwrap();
        let found = repo.active_for_location("Ward 4", since).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn set_status_on_missing_id_errors() {
        let repo = repo().await;
        let result = repo.set_status(Uuid::new_v4(), CoordinationStatus::Completed).await;
        assert!(matches!(result, Err(CoordinatorError::DecisionNotFound(_))));
    }
}
