//! Repository layer for data access operations.
//!
//! Provides async CRUD operations for all domain entities.

mod order_repo;
mod product_repo;
mod report_repo;
mod user_repo;

pub use order_repo::OrderRepository;
pub use product_repo::{ProductFilter, ProductRepository};
pub use report_repo::{CategorySalesRow, ReportRepository};
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub reports: ReportRepository,
}

impl Repositories {
    /// Creates a new Repositories instance with all repositories initialized.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            reports: ReportRepository::new(pool),
        }
    }
}
