//! Serve command handler.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Starts the server, or only validates configuration when `dry_run`.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.config).run().await
    }

    /// Checks everything the server would check at startup, without
    /// touching the network or the database.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        self.config.jwt.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Database pool: {}..{} connections",
            self.config.database.min_connections, self.config.database.max_connections
        );
        println!("✓ Signing secret is configured");
        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/commerce_test".to_string();
        config.jwt.secret = "a-long-enough-secret-for-signing-tokens".to_string();
        config
    }

    #[test]
    fn test_dry_run_accepts_valid_config() {
        let handler = ServeCommandHandler::new(valid_config());
        assert!(handler.validate_only().is_ok());
    }

    #[test]
    fn test_dry_run_rejects_invalid_port() {
        let mut config = valid_config();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config);
        assert!(handler.validate_only().is_err());
    }

    #[tokio::test]
    async fn test_dry_run_requires_signing_secret() {
        let mut config = valid_config();
        config.jwt.secret.clear();

        let result = ServeCommandHandler::new(config).execute(true).await;
        match result {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "jwt.secret"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }
}
