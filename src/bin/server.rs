//! `muniops-server`: thin axum HTTP daemon exposing the four documented
//! routes (SPEC_FULL §6 "External interfaces"). Routing and serde only —
//! all business logic lives in `muniops::jobmanager::JobManager`. Shaped
//! on the teacher's `adapters/mcp/tasks_http.rs` server bootstrap.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use muniops::cli::runtime::bootstrap;
use muniops::coordinator::Coordinator;
use muniops::domain::models::{AgentType, Job, JobStatus, Money, Request, RequestType};
use muniops::infrastructure::logging::{LogConfig, LoggerHandle};
use muniops::jobmanager::JobManager;

struct AppState {
    job_manager: Arc<JobManager>,
    db_pool: sqlx::SqlitePool,
}

#[derive(Debug, Deserialize)]
struct QueryRequestBody {
    #[serde(rename = "type")]
    request_type: String,
    location: String,
    #[serde(default)]
    originator: String,
    #[serde(default)]
    estimated_cost: Option<i64>,
    #[serde(default)]
    resources_needed: BTreeSet<String>,
    #[serde(default, flatten)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct QueryAcceptedResponse {
    job_id: Uuid,
    status: &'static str,
    agent_type: AgentType,
}

#[derive(Debug, Serialize)]
struct JobView {
    id: Uuid,
    agent_type: AgentType,
    status: JobStatus,
    created_at: chrono::DateTime<chrono::Utc>,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
    result: Option<muniops::domain::models::PipelineOutput>,
    error: Option<muniops::domain::models::JobErrorPayload>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            agent_type: job.agent_type,
            status: job.status,
            created_at: job.created_at,
            finished_at: job.finished_at,
            result: job.result,
            error: job.error,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultView {
    status: JobStatus,
    result: Option<muniops::domain::models::PipelineOutput>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    coordinator: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

async fn submit_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequestBody>,
) -> Result<(StatusCode, Json<QueryAcceptedResponse>), ApiError> {
    let request_type = RequestType::new(&body.request_type);
    let request = Request {
        request_type: request_type.clone(),
        location: body.location,
        originator: body.originator,
        estimated_cost: body.estimated_cost.map(Money::rupees),
        resources_needed: body.resources_needed,
        fields: body.fields,
    };

    if !request.basic_fields_present() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "location and originator are required".into()));
    }

    let agent_type = Coordinator::dispatch(&request_type);
    let job_id = state
        .job_manager
        .submit(request)
        .await
        .map_err(|e| ApiError(StatusCode::TOO_MANY_REQUESTS, e.to_string()))?;

    Ok((StatusCode::ACCEPTED, Json(QueryAcceptedResponse { job_id, status: "queued", agent_type })))
}

async fn get_query(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobView>, ApiError> {
    let job = state.job_manager.get(job_id).await.map_err(|e| ApiError(StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(JobView::from(job)))
}

async fn get_query_result(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ResultView>, ApiError> {
    let job = state.job_manager.get(job_id).await.map_err(|e| ApiError(StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(ResultView { status: job.status, result: job.result }))
}

async fn cancel_query(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.job_manager.cancel(job_id).await.map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let coordinator_up = sqlx::query("SELECT 1").execute(&state.db_pool).await.is_ok();
    Json(HealthResponse {
        status: if coordinator_up { "ok" } else { "degraded" },
        coordinator: if coordinator_up { "up" } else { "down" },
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/query", post(submit_query))
        .route("/api/v1/query/{job_id}", get(get_query))
        .route("/api/v1/query/{job_id}", axum::routing::delete(cancel_query))
        .route("/api/v1/query/{job_id}/result", get(get_query_result))
        .route("/api/v1/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let runtime = bootstrap().await?;
    let _logger = LoggerHandle::init(&LogConfig::from_domain(&runtime.config.logging)?)?;

    let state = Arc::new(AppState { job_manager: runtime.job_manager, db_pool: runtime.db_pool });

    let addr: SocketAddr = "0.0.0.0:8080".parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "muniops-server listening");
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
