//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;
