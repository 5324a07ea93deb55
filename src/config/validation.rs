//! Configuration validation logic
//!
//! Each section checks its own ranges; `Settings::validate` runs them all.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CatalogConfig, CorsConfig, DatabaseConfig, JwtConfig, ServerConfig, Settings,
};

/// Minimum HMAC secret length accepted for token signing
pub const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request and keep-alive timeouts must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation("server.host", "Host cannot be empty."));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// # Validation Rules
    /// - URL must be a `postgres://` or `postgresql://` URL
    /// - Pool bounds must satisfy `0 < min <= max`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set it in the config file or COMMERCE_DATABASE__URL.",
            ));
        }

        if !["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError {
                field: "jwt.secret".to_string(),
                message: format!(
                    "JWT secret should be at least {MIN_JWT_SECRET_LEN} characters for security"
                ),
            });
        }

        if self.token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.token_expiration",
                "Token expiration must be positive",
            ));
        }

        Ok(())
    }
}

impl CorsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for origin in &self.allowed_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(ConfigError::ValidationError {
                    field: "cors.allowed_origins".to_string(),
                    message: format!("Invalid origin '{origin}'"),
                });
            }
        }
        Ok(())
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size < 1 {
            return Err(ConfigError::validation(
                "catalog.max_page_size",
                "Max page size must be at least 1",
            ));
        }

        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            return Err(ConfigError::ValidationError {
                field: "catalog.default_page_size".to_string(),
                message: format!(
                    "Default page size must be between 1 and {}",
                    self.max_page_size
                ),
            });
        }

        Ok(())
    }
}

impl Settings {
    /// Validates every section.
    ///
    /// The JWT secret is checked separately at server start so that
    /// `migrate` and `seed` run without one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.cors.validate()?;
        self.catalog.validate()?;
        self.logger
            .validate()
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/shop".to_string();
        settings.jwt.secret = "a".repeat(MIN_JWT_SECRET_LEN);
        settings
    }

    fn field_of(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        let settings = valid_settings();
        assert!(settings.validate().is_ok());
        assert!(settings.jwt.validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert_eq!(field_of(settings.validate()), "server.port");
    }

    #[test]
    fn test_database_url_required_and_postgres_only() {
        let mut settings = valid_settings();
        settings.database.url.clear();
        assert_eq!(field_of(settings.validate()), "database.url");

        settings.database.url = "mysql://localhost/shop".to_string();
        assert_eq!(field_of(settings.validate()), "database.url");
    }

    #[test]
    fn test_min_connections_cannot_exceed_max() {
        let mut settings = valid_settings();
        settings.database.min_connections = 5;
        settings.database.max_connections = 2;
        assert_eq!(field_of(settings.validate()), "database.min_connections");
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let jwt = JwtConfig {
            secret: "short".to_string(),
            token_expiration: 24,
        };
        assert_eq!(field_of(jwt.validate()), "jwt.secret");
    }

    #[test]
    fn test_non_positive_token_expiration_rejected() {
        let jwt = JwtConfig {
            secret: "a".repeat(40),
            token_expiration: 0,
        };
        assert_eq!(field_of(jwt.validate()), "jwt.token_expiration");
    }

    #[test]
    fn test_missing_jwt_secret_does_not_fail_settings() {
        let mut settings = valid_settings();
        settings.jwt.secret.clear();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_page_size_within_max() {
        let mut settings = valid_settings();
        settings.catalog.default_page_size = 200;
        assert_eq!(field_of(settings.validate()), "catalog.default_page_size");
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        let mut settings = valid_settings();
        settings.cors.allowed_origins = vec!["http://bad\norigin".to_string()];
        assert_eq!(field_of(settings.validate()), "cors.allowed_origins");
    }

    #[test]
    fn test_logger_errors_surface_as_validation() {
        let mut settings = valid_settings();
        settings.logger.console.enabled = false;
        assert_eq!(field_of(settings.validate()), "logger");
    }
}
