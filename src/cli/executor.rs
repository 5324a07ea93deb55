//! Dispatches a parsed command to its handler.

use super::handlers::{
    MigrateCommandHandler, PromoteCommandHandler, SeedCommandHandler, ServeCommandHandler,
};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Runs the command named by `cli`; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    cli.validate()
        .map_err(|reason| AppError::validation("cli_arguments", reason))?;

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            warn_on_large_rollback(*rollback);
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
        Some(Commands::Seed { append }) => SeedCommandHandler::new(settings).execute(*append).await,
        Some(Commands::Promote { email, role }) => {
            PromoteCommandHandler::new(settings)
                .execute(email, (*role).into())
                .await
        }
    }
}

fn warn_on_large_rollback(rollback: Option<u32>) {
    if let Some(steps) = rollback
        && steps > 50
    {
        eprintln!(
            "Warning: Rolling back {} migrations is a large operation. Consider using smaller steps.",
            steps
        );
    }
}
