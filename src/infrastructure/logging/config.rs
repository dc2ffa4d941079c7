//! Runtime logging configuration derived from `domain::models::config::LoggingConfig`
//! (SPEC_FULL §6 "Configuration"). Kept separate from the domain config because
//! it carries parsed enums the domain's figment-facing strings don't need.

use crate::domain::error::ConfigError;
use crate::domain::models::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<String>,
    pub enable_stdout: bool,
    pub rotation: RotationPolicy,
    pub retention_days: i64,
}

impl LogConfig {
    /// Parses and validates the domain config's logging section. A job-long
    /// pipeline never reloads this mid-run, so this runs once at startup.
    pub fn from_domain(cfg: &LoggingConfig) -> Result<Self, ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&cfg.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(cfg.level.clone()));
        }

        let format = match cfg.format.as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => return Err(ConfigError::InvalidLogLevel(other.to_string())),
        };

        Ok(Self {
            level: cfg.level.clone(),
            format,
            log_dir: cfg.log_dir.clone(),
            enable_stdout: true,
            rotation: RotationPolicy::Daily,
            retention_days: 30,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_domain_config_parses() {
        let domain = LoggingConfig { level: "debug".into(), format: "json".into(), log_dir: None };
        let parsed = LogConfig::from_domain(&domain).unwrap();
        assert_eq!(parsed.format, LogFormat::Json);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let domain = LoggingConfig { level: "shout".into(), format: "json".into(), log_dir: None };
        assert!(LogConfig::from_domain(&domain).is_err());
    }
}
