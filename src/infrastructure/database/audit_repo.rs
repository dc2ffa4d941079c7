//! `SQLite` implementation of `AuditRepository` (SPEC_FULL §2 item 8,
//! persisted as the `agent_decisions` table).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::domain::error::CoordinatorError;
use crate::domain::models::{AgentType, AuditRecord, Decision, Money};
use crate::domain::ports::AuditRepository;

pub struct AuditRepositoryImpl {
    pool: SqlitePool,
}

impl AuditRepositoryImpl {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AuditRow {
    id: String,
    request_id: String,
    agent_type: String,
    state_snapshot: String,
    rationale: String,
    policies_referenced: String,
    affected_citizens: Option<i64>,
    cost_impact: Option<i64>,
    timestamp: String,
    decision: Option<String>,
}

fn parse_agent_type(raw: &str) -> Result<AgentType, CoordinatorError> {
    AgentType::all()
        .into_iter()
        .find(|a| a.as_str() == raw)
        .ok_or_else(|| CoordinatorError::Storage(format!("unknown agent_type in row: {raw}")))
}

fn decision_str(decision: Decision) -> &'static str {
    match decision {
        Decision::Recommend => "recommend",
        Decision::Escalate => "escalate",
        Decision::Reject => "reject",
    }
}

fn parse_decision(raw: &str) -> Result<Decision, CoordinatorError> {
    match raw {
        "recommend" => Ok(Decision::Recommend),
        "escalate" => Ok(Decision::Escalate),
        "reject" => Ok(Decision::Reject),
        other => Err(CoordinatorError::Storage(format!("unknown decision in row: {other}"))),
    }
}

fn parse_row(row: AuditRow) -> Result<AuditRecord, CoordinatorError> {
    let id = Uuid::parse_str(&row.id).map_err(|e| CoordinatorError::Storage(e.to_string()))?;
    let request_id =
        Uuid::parse_str(&row.request_id).map_err(|e| CoordinatorError::Storage(e.to_string()))?;
    let state_snapshot: serde_json::Value = serde_json::from_str(&row.state_snapshot)
        .map_err(|e| CoordinatorError::Storage(format!("invalid state_snapshot json: {e}")))?;
    let policies_referenced: Vec<String> = serde_json::from_str(&row.policies_referenced)
        .map_err(|e| CoordinatorError::Storage(format!("invalid policies_referenced json: {e}")))?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.timestamp)
        .map_err(|e| CoordinatorError::Storage(format!("invalid timestamp: {e}")))?
        .with_timezone(&Utc);
    let decision = row.decision.as_deref().map(parse_decision).transpose()?;

    Ok(AuditRecord {
        id,
        request_id,
        agent_type: parse_agent_type(&row.agent_type)?,
        state_snapshot,
        rationale: row.rationale,
        policies_referenced,
        affected_citizens: row.affected_citizens.and_then(|v| u64::try_from(v).ok()),
        cost_impact: row.cost_impact.map(Money::rupees),
        timestamp,
        decision,
    })
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn append(&self, record: AuditRecord) -> Result<(), CoordinatorError> {
        // Idempotent by id: `INSERT OR IGNORE` makes a second call with the
        // same record a no-op rather than a uniqueness error.
        let id_str = record.id.to_string();
        let request_id_str = record.request_id.to_string();
        let agent_type_str = record.agent_type.as_str();
        let state_snapshot_json = serde_json::to_string(&record.state_snapshot)
            .map_err(|e| CoordinatorError::Storage(e.to_string()))?;
        let policies_json = serde_json::to_string(&record.policies_referenced)
            .map_err(|e| CoordinatorError::Storage(e.to_string()))?;
        let affected_citizens = record.affected_citizens.and_then(|v| i64::try_from(v).ok());
        let cost_impact = record.cost_impact.map(|m| m.0);
        let timestamp_str = record.timestamp.to_rfc3339();
        let decision_str = record.decision.map(decision_str);

        sqlx::query(
            "INSERT OR IGNORE INTO agent_decisions \
             (id, request_id, agent_type, state_snapshot, rationale, policies_referenced, \
              affected_citizens, cost_impact, timestamp, decision) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id_str)
        .bind(request_id_str)
        .bind(agent_type_str)
        .bind(state_snapshot_json)
        .bind(record.rationale)
        .bind(policies_json)
        .bind(affected_citizens)
        .bind(cost_impact)
        .bind(timestamp_str)
        .bind(decision_str)
        .execute(&self.pool)
        .await
        .map_err(|e| CoordinatorError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AuditRecord>, CoordinatorError> {
        let id_str = id.to_string();
        let row: Option<AuditRow> = sqlx::query_as(
            "SELECT id, request_id, agent_type, state_snapshot, rationale, \
             policies_referenced, affected_citizens, cost_impact, timestamp, decision \
             FROM agent_decisions WHERE id = ?",
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
    use crate::domain::models::{AgentState, Request, RequestType};
    use crate::infrastructure::database::DatabasePool;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    async fn repo() -> AuditRepositoryImpl {
        let db = DatabasePool::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        AuditRepositoryImpl::new(db.pool())
    }

    fn sample_state() -> AgentState {
        let request = Request {
            request_type: RequestType::new("capacity_query"),
            location: "Ward 4".into(),
            originator: "clerk-1".into(),
            estimated_cost: None,
            resources_needed: BTreeSet::new(),
            fields: BTreeMap::new(),
        };
        AgentState::new(Uuid::new_v4(), AgentType::Water, request)
    }

    #[tokio::test]
    async fn append_and_get_round_trips() {
        let repo = repo().await;
        let state = sample_state();
        let record = AuditRecord::from_state(Uuid::new_v4(), &state, "within routine bounds".into())
            .with_decision(Decision::Recommend);
        repo.append(record.clone()).await.unwrap();

        let fetched = repo.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.request_id, record.request_id);
        assert_eq!(fetched.rationale, record.rationale);
        assert_eq!(fetched.decision, Some(Decision::Recommend));
    }

    #[tokio::test]
    async fn append_is_idempotent_by_id() {
        let repo = repo().await;
        let state = sample_state();
        let id = Uuid::new_v4();
        let record = AuditRecord::from_state(id, &state, "first".into());
        repo.append(record.clone()).await.unwrap();
        repo.append(record).await.unwrap();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agent_decisions WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = repo().await;
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
