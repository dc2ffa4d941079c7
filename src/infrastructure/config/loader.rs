//! `ConfigLoader`: hierarchical configuration assembly (SPEC_FULL §6
//! "Configuration"), mirrored on the teacher's figment-based loader.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::domain::error::ConfigError;
use crate::domain::models::Config;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.muniops/config.yaml` (project config)
    /// 3. `.muniops/local.yaml` (optional dev/test overrides)
    /// 4. `MUNIOPS_*` environment variables (highest priority)
    pub fn load() -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".muniops/config.yaml"))
            .merge(Yaml::file(".muniops/local.yaml"))
            .merge(Env::prefixed("MUNIOPS_").split("__"))
            .extract()
            .map_err(|e| ConfigError::ExtractionFailed(e.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .map_err(|e| ConfigError::ExtractionFailed(e.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// SPEC_FULL §6: the constraints a loaded config must satisfy before
    /// any job is accepted.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&config.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold(config.confidence_threshold));
        }
        if config.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.max_retries));
        }
        if config.cost_escalation_limit_rupees <= 0 {
            #[allow(clippy::cast_precision_loss)]
            return Err(ConfigError::InvalidCostLimit(config.cost_escalation_limit_rupees as f64));
        }
        if config.conflict_window_hours <= 0 {
            return Err(ConfigError::InvalidConflictWindow(config.conflict_window_hours));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::ExtractionFailed(format!(
                "retry.initial_backoff_ms ({}) must be less than retry.max_backoff_ms ({})",
                config.retry.initial_backoff_ms, config.retry.max_backoff_ms
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let mut config = Config::default();
        config.confidence_threshold = 1.5;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn rejects_zero_max_retries() {
        let mut config = Config::default();
        config.max_retries = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxRetries(0))));
    }

    #[test]
    fn rejects_backwards_backoff_bounds() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 10_000;
        config.retry.max_backoff_ms = 1_000;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn loads_from_explicit_yaml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "confidence_threshold: 0.9\nmax_retries: 5").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert!((config.confidence_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.max_retries, 5);
    }
}
