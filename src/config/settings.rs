//! Configuration settings structures for commerce-rs
//!
//! Every section can be loaded from TOML files and overridden through
//! `COMMERCE_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::logger::LoggerConfig;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "commerce-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_token_expiration() -> i64 {
    24
}

fn default_page_size() -> i64 {
    10
}

fn default_max_page_size() -> i64 {
    100
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Run pending migrations before serving
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

/// Bearer token signing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret; supply it through `COMMERCE_JWT__SECRET` outside development
    #[serde(default)]
    pub secret: String,

    /// Token lifetime in hours
    #[serde(default = "default_token_expiration")]
    pub token_expiration: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_expiration: default_token_expiration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Product listing pagination limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logger: LoggerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{LogFormat, RotationStrategy};

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.application.name, "commerce-rs");
        assert_eq!(settings.application.version, crate::pkg_version());
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.server.address(), "127.0.0.1:5000");
        assert_eq!(settings.jwt.token_expiration, 24);
        assert_eq!(settings.catalog.default_page_size, 10);
        assert_eq!(settings.catalog.max_page_size, 100);
        assert!(settings.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/shop"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.database.url, "postgres://localhost/shop");
        assert_eq!(settings.database.max_connections, 10);
    }

    #[test]
    fn test_stale_keep_alive_key_is_ignored() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            request_timeout = 15
            keep_alive_timeout = 0
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.request_timeout, 15);
        assert!(settings.server.validate().is_ok());
    }

    #[test]
    fn test_deserialize_full() {
        let settings: Settings = toml::from_str(
            r#"
            [application]
            name = "shop"
            version = "2.0.0"

            [server]
            host = "0.0.0.0"
            port = 5000
            request_timeout = 10

            [database]
            url = "postgres://user:pass@db:5432/shop"
            max_connections = 20
            min_connections = 2
            connection_timeout = 5
            auto_migrate = true

            [jwt]
            secret = "0123456789abcdef0123456789abcdef"
            token_expiration = 12

            [cors]
            allowed_origins = ["http://localhost:3000"]

            [catalog]
            default_page_size = 20
            max_page_size = 50

            [logger]
            level = "debug"

            [logger.file]
            enabled = true
            path = "logs/shop.log"
            format = "full"

            [logger.file.rotation]
            strategy = "never"
            "#,
        )
        .unwrap();

        assert_eq!(settings.application.name, "shop");
        assert!(settings.database.auto_migrate);
        assert_eq!(settings.jwt.token_expiration, 12);
        assert_eq!(settings.cors.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(settings.catalog.max_page_size, 50);
        assert_eq!(settings.logger.file.format, LogFormat::Full);
        assert_eq!(settings.logger.file.rotation.strategy, RotationStrategy::Never);
    }
}
