//! Seed command handler.

use super::connect_services;
use crate::config::Settings;
use crate::error::AppResult;

pub struct SeedCommandHandler {
    config: Settings,
}

impl SeedCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Loads the sample catalog, replacing existing products unless `append`.
    pub async fn execute(&self, append: bool) -> AppResult<()> {
        let services = connect_services(&self.config).await?;

        if !append {
            println!("Replacing the catalog with the sample products...");
        }
        let inserted = services.catalog.seed(append).await?;
        println!("✓ Inserted {} product(s)", inserted);
        Ok(())
    }
}
