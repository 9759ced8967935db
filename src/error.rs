use crate::config::ConfigLoadError;
use crate::credits::aggregation::EntryImportError;
use crate::credits::forms::ConfigError;
use crate::credits::registry::RegistryError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Every fallible surface of the crate, for hosts that want one error type.
#[derive(Debug)]
pub enum EngineError {
    Settings(ConfigLoadError),
    Telemetry(TelemetryError),
    Registry(RegistryError),
    Import(EntryImportError),
    Config(ConfigError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Settings(err) => write!(f, "settings error: {}", err),
            EngineError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            EngineError::Registry(err) => write!(f, "registry error: {}", err),
            EngineError::Import(err) => write!(f, "import error: {}", err),
            EngineError::Config(err) => write!(f, "jurisdiction configuration error: {}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Settings(err) => Some(err),
            EngineError::Telemetry(err) => Some(err),
            EngineError::Registry(err) => Some(err),
            EngineError::Import(err) => Some(err),
            EngineError::Config(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for EngineError {
    fn from(value: ConfigLoadError) -> Self {
        Self::Settings(value)
    }
}

impl From<TelemetryError> for EngineError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<RegistryError> for EngineError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<EntryImportError> for EngineError {
    fn from(value: EntryImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ConfigError> for EngineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
