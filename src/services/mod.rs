//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod catalog_service;
mod order_service;
mod report_service;
mod user_service;

pub use catalog_service::{CatalogService, ProductPage, ProductQuery, page_count, sample_catalog};
pub use order_service::OrderService;
pub use report_service::{CategorySales, ReportService};
pub use user_service::{AddressInput, Profile, UserService};

use crate::config::CatalogConfig;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since the underlying pool uses `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub reports: ReportService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories, catalog: CatalogConfig) -> Self {
        Self {
            users: UserService::new(repos.users),
            catalog: CatalogService::new(repos.products, catalog),
            orders: OrderService::new(repos.orders),
            reports: ReportService::new(repos.reports),
        }
    }
}
