//! Configuration management
//!
//! Layered TOML files plus `COMMERCE_*` environment overrides; see
//! [`ConfigLoader`] for precedence.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, CatalogConfig, CorsConfig, DatabaseConfig, JwtConfig, ServerConfig,
    Settings,
};
