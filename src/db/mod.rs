//! Database connection pool module.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8,
//! plus the embedded schema migrations.

mod pool;
#[cfg(test)]
pub(crate) mod testing;

pub use pool::{
    AsyncDbPool, MIGRATIONS, establish_async_connection_pool, lazy_connection_pool,
    pending_migrations, revert_migrations, run_pending_migrations,
};
