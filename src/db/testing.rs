//! PostgreSQL fixtures for tests that need a live database.
//!
//! Those tests are ignored by default. Point `DATABASE_URL` at a scratch
//! database and run `cargo test -- --ignored`.

use bigdecimal::BigDecimal;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::db::{AsyncDbPool, lazy_connection_pool, run_pending_migrations};
use crate::models::{NewProduct, NewUser, Product, Role, User};
use crate::repositories::{ProductRepository, UserRepository};

static DATABASE_URL: OnceCell<String> = OnceCell::const_new();

/// Pool over `DATABASE_URL`; migrations run once per test binary.
pub async fn migrated_pool() -> AsyncDbPool {
    let url = DATABASE_URL
        .get_or_init(|| async {
            let url = std::env::var("DATABASE_URL")
                .expect("DATABASE_URL must name a scratch PostgreSQL database");
            run_pending_migrations(&url)
                .await
                .expect("migrations should apply");
            url
        })
        .await;
    lazy_connection_pool(url)
}

/// `prefix` plus a random suffix, for values under unique constraints.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

pub async fn create_user(pool: &AsyncDbPool, role: Role) -> User {
    let username = unique("u");
    UserRepository::new(pool.clone())
        .create(NewUser {
            email: format!("{username}@example.com"),
            username,
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .expect("user should insert")
}

pub async fn create_product(pool: &AsyncDbPool, category: &str, price: &str, stock: i32) -> Product {
    ProductRepository::new(pool.clone())
        .create(NewProduct {
            name: unique("p"),
            description: "fixture".to_string(),
            price: price.parse::<BigDecimal>().expect("price literal"),
            category: category.to_string(),
            stock,
            images: Vec::new(),
            rating: 0.0,
        })
        .await
        .expect("product should insert")
}

pub async fn stock_of(pool: &AsyncDbPool, product_id: Uuid) -> i32 {
    ProductRepository::new(pool.clone())
        .find_by_id(product_id)
        .await
        .expect("product lookup")
        .expect("product exists")
        .stock
}
