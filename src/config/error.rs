//! Errors raised while loading or checking settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The merged sources did not deserialize into `Settings`
    #[error("Invalid configuration shape: {0}")]
    ParseError(String),

    /// A value parsed but breaks a rule, e.g. `database.url` without a postgres scheme
    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid environment variable: {0}")]
    EnvVarError(String),

    /// `COMMERCE_CONFIG_DIR` and `COMMERCE_CONFIG_FILE` were both set
    #[error("Conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// The settings key the error is about, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = ConfigError::validation("server.port", "Port cannot be 0");
        assert_eq!(err.field(), Some("server.port"));
        assert_eq!(err.to_string(), "Invalid value for server.port: Port cannot be 0");
    }

    #[test]
    fn test_other_errors_have_no_field() {
        assert_eq!(ConfigError::file_not_found("app.toml").field(), None);
    }
}
