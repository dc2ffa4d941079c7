//! Configuration schema (SPEC_FULL §6 "Configuration"). Loaded by
//! `infrastructure::config::ConfigLoader`.

use serde::{Deserialize, Serialize};

/// Per-node LLM enablement flags (SPEC_FULL §4.5, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmFlags {
    #[serde(default = "default_true")]
    pub planner: bool,
    #[serde(default = "default_true")]
    pub observer: bool,
    #[serde(default = "default_true")]
    pub policy: bool,
    #[serde(default = "default_true")]
    pub confidence: bool,
    #[serde(default = "default_true")]
    pub intent: bool,
    #[serde(default = "default_true")]
    pub goal: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for LlmFlags {
    fn default() -> Self {
        Self {
            planner: true,
            observer: true,
            policy: true,
            confidence: true,
            intent: true,
            goal: true,
        }
    }
}

impl LlmFlags {
    #[must_use]
    pub const fn all_disabled() -> Self {
        Self {
            planner: false,
            observer: false,
            policy: false,
            confidence: false,
            intent: false,
            goal: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_llm_provider() -> String {
    "anthropic".to_string()
}
fn default_llm_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
const fn default_temperature() -> f32 {
    0.2
}
fn default_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
const fn default_timeout_ms() -> u64 {
    8_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            temperature: default_temperature(),
            api_key: None,
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Context Store connection parameters (SPEC_FULL §6 "Configuration").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextStoreConfig {
    #[serde(default = "default_context_store_base_url")]
    pub base_url: String,
    #[serde(default = "default_context_store_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_context_store_base_url() -> String {
    "http://localhost:8088".to_string()
}
const fn default_context_store_timeout_ms() -> u64 {
    3_000
}

impl Default for ContextStoreConfig {
    fn default() -> Self {
        Self { base_url: default_context_store_base_url(), timeout_ms: default_context_store_timeout_ms() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".muniops/muniops.db".to_string()
}
const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_connections: default_max_connections() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format(), log_dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    #[serde(default = "default_rps")]
    pub requests_per_second: f64,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

const fn default_rps() -> f64 {
    10.0
}
const fn default_burst() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { requests_per_second: default_rps(), burst_size: default_burst() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_llm_max_retries() -> u32 {
    3
}
const fn default_initial_backoff_ms() -> u64 {
    500
}
const fn default_max_backoff_ms() -> u64 {
    8_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_llm_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Top-level configuration (SPEC_FULL §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Decision gate (default 0.7).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Pipeline replan cap (default 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Above this, conflicts escalate to humans instead of retrying
    /// (default ₹50L = 50,00,000).
    #[serde(default = "default_cost_escalation_limit")]
    pub cost_escalation_limit_rupees: i64,

    /// The Coordinator's fiscal-scope budget ceiling used by the budget
    /// conflict check (SPEC_FULL §4.2). Not named explicitly among the
    /// spec's listed config keys; fixed here as an implementer decision
    /// (SPEC_FULL §9) at ₹3 crore so the scenario-3 deadlock (four
    /// submissions summing to ₹12 crore) triggers conflicts starting at
    /// the second submission.
    #[serde(default = "default_budget_ceiling")]
    pub conflict_budget_ceiling_rupees: i64,

    /// Test vs production intervention mode (default false).
    #[serde(default)]
    pub coordination_auto_approve: bool,

    /// Active-decisions lookback window, in hours (default 24h).
    #[serde(default = "default_conflict_window_hours")]
    pub conflict_window_hours: i64,

    /// Wall-clock cap per job, in seconds.
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,

    #[serde(default)]
    pub llm_flags: LlmFlags,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub context_store: ContextStoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

const fn default_confidence_threshold() -> f64 {
    0.7
}
const fn default_max_retries() -> u32 {
    3
}
const fn default_cost_escalation_limit() -> i64 {
    50_00_000
}
const fn default_budget_ceiling() -> i64 {
    3_00_00_000
}
const fn default_conflict_window_hours() -> i64 {
    24
}
const fn default_job_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_retries: default_max_retries(),
            cost_escalation_limit_rupees: default_cost_escalation_limit(),
            conflict_budget_ceiling_rupees: default_budget_ceiling(),
            coordination_auto_approve: false,
            conflict_window_hours: default_conflict_window_hours(),
            job_timeout_secs: default_job_timeout_secs(),
            llm_flags: LlmFlags::default(),
            llm: LlmConfig::default(),
            database: DatabaseConfig::default(),
            context_store: ContextStoreConfig::default(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}
