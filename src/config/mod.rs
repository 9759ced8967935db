use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::credits::aggregation::DEFAULT_LOOKBACK_YEARS;

/// Distinguishes runtime behavior for different stages of the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEnvironment {
    Development,
    Test,
    Production,
}

impl EngineEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for an embedding host.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub environment: EngineEnvironment,
    pub telemetry: TelemetryConfig,
    pub registry: RegistryConfig,
    pub aggregation: AggregationConfig,
}

impl EngineConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        dotenvy::dotenv().ok();

        let environment = EngineEnvironment::from_str(
            &env::var("PROFORMA_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("PROFORMA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let catalog_path = env::var("PROFORMA_REGISTRY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let lookback = env::var("PROFORMA_GROSS_RECEIPTS_YEARS")
            .unwrap_or_else(|_| DEFAULT_LOOKBACK_YEARS.to_string());
        let gross_receipts_lookback_years = lookback
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|years| *years > 0)
            .ok_or(ConfigLoadError::InvalidLookback { value: lookback })?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            registry: RegistryConfig { catalog_path },
            aggregation: AggregationConfig {
                gross_receipts_lookback_years,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the jurisdiction catalog comes from.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub gross_receipts_lookback_years: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            gross_receipts_lookback_years: DEFAULT_LOOKBACK_YEARS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigLoadError {
    InvalidLookback { value: String },
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::InvalidLookback { value } => write!(
                f,
                "PROFORMA_GROSS_RECEIPTS_YEARS must be a positive integer, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("PROFORMA_ENV");
        env::remove_var("PROFORMA_LOG_LEVEL");
        env::remove_var("PROFORMA_REGISTRY_PATH");
        env::remove_var("PROFORMA_GROSS_RECEIPTS_YEARS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = EngineConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, EngineEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.registry.catalog_path.is_none());
        assert_eq!(config.aggregation.gross_receipts_lookback_years, 3);
    }

    #[test]
    fn reads_overrides_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PROFORMA_ENV", "prod");
        env::set_var("PROFORMA_REGISTRY_PATH", "/etc/proforma/catalog.json");
        env::set_var("PROFORMA_GROSS_RECEIPTS_YEARS", " 4 ");
        let config = EngineConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, EngineEnvironment::Production);
        assert_eq!(
            config.registry.catalog_path,
            Some(PathBuf::from("/etc/proforma/catalog.json"))
        );
        assert_eq!(config.aggregation.gross_receipts_lookback_years, 4);
    }

    #[test]
    fn rejects_zero_lookback() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PROFORMA_GROSS_RECEIPTS_YEARS", "0");
        let result = EngineConfig::load();
        reset_env();

        match result {
            Err(ConfigLoadError::InvalidLookback { value }) => assert_eq!(value, "0"),
            other => panic!("expected invalid lookback, got {other:?}"),
        }
    }
}
