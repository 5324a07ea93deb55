//! Promote command handler.

use super::connect_services;
use crate::config::Settings;
use crate::error::AppResult;
use crate::models::Role;

pub struct PromoteCommandHandler {
    config: Settings,
}

impl PromoteCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Sets the role of the account registered under `email`.
    ///
    /// # Errors
    /// `NotFound` when no account uses that email
    pub async fn execute(&self, email: &str, role: Role) -> AppResult<()> {
        let services = connect_services(&self.config).await?;
        let user = services.users.set_role(email, role).await?;
        println!("✓ {} <{}> is now {}", user.username, user.email, user.role);
        Ok(())
    }
}
