//! One handler per CLI subcommand.

pub mod migrate;
pub mod promote;
pub mod seed;
pub mod serve;

pub use migrate::MigrateCommandHandler;
pub use promote::PromoteCommandHandler;
pub use seed::SeedCommandHandler;
pub use serve::ServeCommandHandler;

use crate::config::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::AppResult;
use crate::repositories::Repositories;
use crate::services::Services;

/// Opens a pool and wires the service layer for one-shot commands.
async fn connect_services(settings: &Settings) -> AppResult<Services> {
    let pool = establish_async_connection_pool(&settings.database).await?;
    Ok(Services::new(
        Repositories::new(pool),
        settings.catalog.clone(),
    ))
}
