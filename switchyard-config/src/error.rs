// Error types for route files and settings

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid input field pattern for route '{route}': {reason}")]
    FieldPattern { route: String, reason: String },

    #[error("Route error: {0}")]
    Route(#[from] switchyard_core::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for switchyard_core::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Route(inner) => inner,
            ConfigError::FieldPattern { .. } => switchyard_core::Error::InvalidRegistry(err.to_string()),
            other => switchyard_core::Error::InvalidRoute(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_errors_pass_through() {
        let inner = switchyard_core::Error::MissingAncestor {
            key: "a.b".into(),
            ancestor: "a".into(),
        };
        let core: switchyard_core::Error = ConfigError::Route(inner.clone()).into();
        assert_eq!(core, inner);
    }

    #[test]
    fn test_other_errors_become_invalid_route() {
        let core: switchyard_core::Error = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(core, switchyard_core::Error::InvalidRoute(m) if m.contains("bad toml")));
    }
}
