//! Shared bootstrap for CLI commands that need a live `JobManager`
//! (`query`, `health`). Builds the same adapter wiring as
//! `muniops-server`'s `main`, since both binaries assemble one process
//! around the same `Config`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::coordinator::{AutoApproveChannel, Coordinator, TerminalChannel};
use crate::domain::models::{AgentType, Config};
use crate::domain::ports::{AuditRepository, ContextStore, HumanApprovalChannel, LlmOracle};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::context_store::HttpContextStore;
use crate::infrastructure::database::{AuditRepositoryImpl, CoordinationRepositoryImpl, DatabasePool};
use crate::jobmanager::JobManager;
use crate::llm::{HttpLlmOracle, LlmAdapter};
use crate::pipeline::AgentPipeline;

pub struct Runtime {
    pub config: Config,
    pub job_manager: Arc<JobManager>,
    pub db_pool: sqlx::SqlitePool,
}

pub async fn bootstrap() -> Result<Runtime> {
    let config = ConfigLoader::load()?;

    let db = DatabasePool::connect(&config.database.path).await?;
    db.migrate().await?;
    let db_pool = db.pool();

    let coordination_repo = Arc::new(CoordinationRepositoryImpl::new(db_pool.clone()));
    let audit_repo: Arc<dyn AuditRepository> = Arc::new(AuditRepositoryImpl::new(db_pool.clone()));
    let human_channel: Arc<dyn HumanApprovalChannel> = if config.coordination_auto_approve {
        Arc::new(AutoApproveChannel)
    } else {
        Arc::new(TerminalChannel)
    };
    let coordinator = Arc::new(Coordinator::new(
        coordination_repo,
        human_channel,
        config.conflict_window_hours,
        config.cost_escalation_limit_rupees,
        config.conflict_budget_ceiling_rupees,
    ));

    let context_store: Arc<dyn ContextStore> = Arc::new(HttpContextStore::new(&config.context_store));
    let oracle: Arc<dyn LlmOracle> = Arc::new(HttpLlmOracle::new(config.llm.clone()));
    let llm = Arc::new(LlmAdapter::new(oracle, &config.llm, &config.retry));

    let mut pipelines = HashMap::new();
    for agent in AgentType::all() {
        pipelines.insert(
            agent,
            Arc::new(AgentPipeline::new(
                agent,
                Arc::clone(&context_store),
                Arc::clone(&llm),
                Arc::clone(&coordinator),
                Arc::clone(&audit_repo),
                config.llm_flags.clone(),
                config.confidence_threshold,
                config.max_retries,
            )),
        );
    }

    let job_manager = Arc::new(JobManager::new(pipelines, config.job_timeout_secs, &config.rate_limit));

    Ok(Runtime { config, job_manager, db_pool })
}
